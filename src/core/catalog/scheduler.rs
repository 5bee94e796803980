//! Debounced saving.
//!
//! Save requests arriving within one window share a single write. Requests
//! made while a write is running wait for the next window, so every request
//! is followed by at least one write that started after it.

use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use anyhow::{Result, anyhow};
use log::{debug, trace};
use tokio::{sync::oneshot, task::JoinHandle};

use super::CatalogManager;
use crate::config::Config;

type Waiter = oneshot::Sender<Result<usize, String>>;
type Flush = Arc<dyn Fn() -> Result<usize> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// A window is open; the write starts when it closes.
    Pending,
    /// A write is in progress.
    Running,
}

struct Shared {
    state: SchedulerState,
    /// Callers waiting for the next write.
    waiters: Vec<Waiter>,
    task: Option<JoinHandle<()>>,
    flushes: usize,
}

#[derive(Clone)]
pub struct SaveScheduler {
    delay: Duration,
    flush: Flush,
    shared: Arc<Mutex<Shared>>,
}

impl SaveScheduler {
    pub fn new(manager: Arc<CatalogManager>, delay: Duration) -> Self {
        Self::with_flush(delay, Arc::new(move || manager.save()))
    }

    /// A scheduler using the configured `saveDelayMs` window.
    pub fn from_config(manager: Arc<CatalogManager>, config: &Config) -> Self {
        Self::new(manager, config.save_delay())
    }

    /// A scheduler whose writes run `flush` instead of saving a manager.
    pub(super) fn with_flush(delay: Duration, flush: Flush) -> Self {
        Self {
            delay,
            flush,
            shared: Arc::new(Mutex::new(Shared {
                state: SchedulerState::Idle,
                waiters: Vec::new(),
                task: None,
                flushes: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SchedulerState {
        self.lock().state
    }

    /// Number of writes performed so far.
    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }

    /// Request a save and wait for the write that covers it.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn save(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        {
            let mut shared = self.lock();
            shared.waiters.push(tx);
            if shared.state == SchedulerState::Idle {
                shared.state = SchedulerState::Pending;
                shared.task = Some(tokio::spawn(self.clone().run()));
            } else {
                trace!("Save joined the {:?} window", shared.state);
            }
        }

        rx.await
            .map_err(|_| anyhow!("Save was cancelled"))?
            .map_err(|e| anyhow!(e))
    }

    async fn run(self) {
        loop {
            tokio::time::sleep(self.delay).await;

            let waiters = {
                let mut shared = self.lock();
                shared.state = SchedulerState::Running;
                mem::take(&mut shared.waiters)
            };
            debug!("Flushing catalogs for {} save request(s)", waiters.len());

            let flush = Arc::clone(&self.flush);
            let result = match tokio::task::spawn_blocking(move || flush()).await {
                Ok(result) => result.map_err(|e| format!("{:#}", e)),
                Err(e) => Err(format!("Save task failed: {}", e)),
            };
            self.lock().flushes += 1;
            for waiter in waiters {
                let _ = waiter.send(result.clone());
            }

            let mut shared = self.lock();
            if shared.waiters.is_empty() {
                shared.state = SchedulerState::Idle;
                shared.task = None;
                return;
            }
            shared.state = SchedulerState::Pending;
        }
    }

    /// Cancel the pending window. Waiting callers get an error.
    pub fn destroy(&self) {
        let mut shared = self.lock();
        if let Some(task) = shared.task.take() {
            task.abort();
        }
        shared.waiters.clear();
        shared.state = SchedulerState::Idle;
    }
}
