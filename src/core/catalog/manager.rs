//! Keeps the per-locale catalogs in sync with the messages used in source code.
//!
//! The manager owns two stores:
//!
//! - the file inventory: every source file's current messages. It alone
//!   decides whether a message is in use.
//! - the translation store: every translation read from target catalogs,
//!   including ids no longer referenced, so a string that comes back after an
//!   edit gets its translation back.
//!
//! Every save projects the inventory into a fresh source catalog and one
//! catalog per target locale.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Component, Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::{Config, Locales};
use crate::core::{
    Catalog, CatalogCodec, ExtractedMessage, ExtractionResult, Format, MessageExtractor,
    resolve::normalize, scan_source_files,
};

/// Lifecycle of a [`CatalogManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Idle,
    Loading,
    Ready,
    Saving,
}

/// A source file whose messages could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Source files scanned (failed ones included).
    pub file_count: usize,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub load: LoadSummary,
    pub message_count: usize,
    pub locales: Vec<String>,
}

#[derive(Debug)]
struct CatalogState {
    phase: ManagerState,
    inventory: HashMap<PathBuf, Vec<ExtractedMessage>>,
    /// locale → id → translated text.
    translations: HashMap<String, HashMap<String, String>>,
    /// Header entries read from each locale's catalog.
    meta: HashMap<String, IndexMap<String, String>>,
    target_locales: Vec<String>,
}

impl CatalogState {
    fn new() -> Self {
        Self {
            phase: ManagerState::Idle,
            inventory: HashMap::new(),
            translations: HashMap::new(),
            meta: HashMap::new(),
            target_locales: Vec::new(),
        }
    }
}

/// Catalogs read from disk during loading.
struct LoadedCatalogs {
    target_locales: Vec<String>,
    translations: HashMap<String, HashMap<String, String>>,
    meta: HashMap<String, IndexMap<String, String>>,
}

pub struct CatalogManager {
    root: PathBuf,
    source_dirs: Vec<PathBuf>,
    ignores: Vec<String>,
    source_locale: String,
    locales: Locales,
    codec: CatalogCodec,
    extractor: MessageExtractor,
    state: Mutex<CatalogState>,
}

impl CatalogManager {
    pub fn new(root: &Path, config: &Config) -> Self {
        Self {
            root: root.to_path_buf(),
            source_dirs: config.source_dirs(root),
            ignores: config.ignores.clone(),
            source_locale: config.source_locale.clone(),
            locales: config.locales.clone(),
            codec: CatalogCodec::new(config.messages_dir(root), config.format),
            extractor: MessageExtractor::new(&config.accessors, config.development),
            state: Mutex::new(CatalogState::new()),
        }
    }

    /// Replace the catalog format, e.g. with a [`Format::Custom`].
    pub fn with_format(mut self, format: impl Into<Format>) -> Self {
        self.codec = CatalogCodec::new(self.codec.messages_path().to_path_buf(), format);
        self
    }

    pub fn codec(&self) -> &CatalogCodec {
        &self.codec
    }

    pub fn source_locale(&self) -> &str {
        &self.source_locale
    }

    pub fn state(&self) -> ManagerState {
        self.lock().phase
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_phase(&self, phase: ManagerState) {
        self.lock().phase = phase;
    }

    /// Path used in message references: relative to the root, `/`-separated.
    fn reference_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Key of a file in the inventory: absolute and lexically normalized, so
    /// the same file always maps to one entry.
    fn inventory_key(&self, path: &Path) -> PathBuf {
        normalize(&self.root.join(path))
    }

    /// Scan all source files and read every target catalog.
    ///
    /// The two scans run in parallel. A source file that fails to extract is
    /// logged and reported in the summary; the other files are still loaded.
    /// An unreadable target catalog aborts loading, since saving without its
    /// translations would erase them.
    pub fn load_messages(&self) -> Result<LoadSummary> {
        self.set_phase(ManagerState::Loading);

        let (sources, catalogs) = rayon::join(|| self.scan_sources(), || self.read_catalogs());
        let catalogs = match catalogs {
            Ok(catalogs) => catalogs,
            Err(e) => {
                self.set_phase(ManagerState::Idle);
                return Err(e);
            }
        };
        let (inventory, summary) = sources;

        let mut state = self.lock();
        state.inventory = inventory;
        state.translations = catalogs.translations;
        state.meta = catalogs.meta;
        state.target_locales = catalogs.target_locales;
        state.phase = ManagerState::Ready;

        info!(
            "Loaded {} source file(s), {} target locale(s)",
            summary.file_count,
            state.target_locales.len()
        );
        Ok(summary)
    }

    fn scan_sources(&self) -> (HashMap<PathBuf, Vec<ExtractedMessage>>, LoadSummary) {
        let scan = scan_source_files(&self.root, &self.source_dirs, &self.ignores);
        let files: Vec<PathBuf> = scan.files.into_iter().collect();

        let results: Vec<(PathBuf, Result<Vec<ExtractedMessage>>)> = files
            .par_iter()
            .map(|path| {
                let result = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read source file: {}", path.display()))
                    .and_then(|content| {
                        self.extractor
                            .extract(&self.reference_path(path), &content)
                            .map(|r| r.messages)
                    });
                (path.clone(), result)
            })
            .collect();

        let mut inventory = HashMap::new();
        let mut summary = LoadSummary {
            file_count: files.len(),
            failures: Vec::new(),
        };
        for (path, result) in results {
            match result {
                Ok(messages) if messages.is_empty() => {}
                Ok(messages) => {
                    inventory.insert(self.inventory_key(&path), messages);
                }
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    summary.failures.push(FileFailure {
                        path,
                        error: format!("{:#}", e),
                    });
                }
            }
        }
        (inventory, summary)
    }

    fn target_locales(&self) -> Result<Vec<String>> {
        let mut locales = match &self.locales {
            Locales::List(list) => list.clone(),
            Locales::Keyword(_) => self.codec.discover_locales()?,
        };
        locales.retain(|l| l != &self.source_locale);
        locales.sort();
        locales.dedup();
        Ok(locales)
    }

    fn read_catalogs(&self) -> Result<LoadedCatalogs> {
        let target_locales = self.target_locales()?;
        let mut translations = HashMap::new();
        let mut meta = HashMap::new();

        let source = self.codec.read(&self.source_locale)?;
        meta.insert(self.source_locale.clone(), source.meta);

        for locale in &target_locales {
            let catalog = self.codec.read(locale)?;
            let store: HashMap<String, String> = catalog
                .messages
                .into_iter()
                .filter(|m| !m.message.is_empty())
                .map(|m| (m.id, m.message))
                .collect();
            debug!("Read {} translation(s) for {}", store.len(), locale);
            translations.insert(locale.clone(), store);
            meta.insert(locale.clone(), catalog.meta);
        }

        Ok(LoadedCatalogs {
            target_locales,
            translations,
            meta,
        })
    }

    /// Re-extract one file and replace its inventory entry.
    ///
    /// A file without messages leaves the inventory. On error the previous
    /// entry is kept.
    pub fn extract_file_messages(&self, path: &Path, content: &str) -> Result<ExtractionResult> {
        let key = self.inventory_key(path);
        let result = self.extractor.extract(&self.reference_path(&key), content)?;

        let mut state = self.lock();
        if result.messages.is_empty() {
            state.inventory.remove(&key);
        } else {
            state.inventory.insert(key, result.messages.clone());
        }
        Ok(result)
    }

    pub fn get_file_messages(&self, path: &Path) -> Option<Vec<ExtractedMessage>> {
        self.lock().inventory.get(&self.inventory_key(path)).cloned()
    }

    /// Number of distinct message ids currently in use.
    pub fn message_count(&self) -> usize {
        source_messages(&self.lock().inventory).len()
    }

    /// Translation of an id in a target locale, referenced or not.
    pub fn translation(&self, locale: &str, id: &str) -> Option<String> {
        self.lock()
            .translations
            .get(locale)
            .and_then(|store| store.get(id))
            .cloned()
    }

    /// Write the source catalog and every target catalog. Returns the number
    /// of messages written.
    pub fn save(&self) -> Result<usize> {
        let (messages, targets, mut meta) = {
            let mut state = self.lock();
            state.phase = ManagerState::Saving;

            let messages = source_messages(&state.inventory);
            let targets: Vec<(String, HashMap<String, String>)> = state
                .target_locales
                .iter()
                .map(|locale| {
                    let store = state.translations.get(locale).cloned().unwrap_or_default();
                    (locale.clone(), store)
                })
                .collect();
            (messages, targets, state.meta.clone())
        };

        let result = self.write_catalogs(&messages, &targets, &mut meta);
        self.set_phase(ManagerState::Ready);
        result?;

        info!(
            "Saved {} message(s) for {} locale(s)",
            messages.len(),
            targets.len() + 1
        );
        Ok(messages.len())
    }

    fn write_catalogs(
        &self,
        messages: &[ExtractedMessage],
        targets: &[(String, HashMap<String, String>)],
        meta: &mut HashMap<String, IndexMap<String, String>>,
    ) -> Result<()> {
        let source = Catalog::new(messages.to_vec())
            .with_meta(meta.remove(&self.source_locale).unwrap_or_default());
        self.codec.write(&self.source_locale, &source)?;

        for (locale, store) in targets {
            let translated = messages
                .iter()
                .map(|m| ExtractedMessage {
                    message: store.get(&m.id).cloned().unwrap_or_default(),
                    ..m.clone()
                })
                .collect();
            let catalog =
                Catalog::new(translated).with_meta(meta.remove(locale).unwrap_or_default());
            self.codec.write(locale, &catalog)?;
        }
        Ok(())
    }

    /// Load everything and save once.
    pub fn extract_all(&self) -> Result<ExtractSummary> {
        let load = self.load_messages()?;
        let message_count = self.save()?;

        Ok(ExtractSummary {
            load,
            message_count,
            locales: self.locales(),
        })
    }

    /// The source locale followed by the target locales found by the last load.
    pub fn locales(&self) -> Vec<String> {
        let mut locales = vec![self.source_locale.clone()];
        locales.extend(self.lock().target_locales.iter().cloned());
        locales
    }

    /// Drop all loaded state.
    pub fn destroy(&self) {
        *self.lock() = CatalogState::new();
        self.extractor.clear_cache();
    }
}

/// Flatten the inventory into one message per id, sorted by id.
///
/// Files are visited in path order, so the first file (by path) decides the
/// message text and description when two files disagree.
fn source_messages(inventory: &HashMap<PathBuf, Vec<ExtractedMessage>>) -> Vec<ExtractedMessage> {
    let mut paths: Vec<&PathBuf> = inventory.keys().collect();
    paths.sort();

    let mut merged: BTreeMap<&str, ExtractedMessage> = BTreeMap::new();
    for path in paths {
        for message in &inventory[path] {
            match merged.get_mut(message.id.as_str()) {
                Some(existing) => existing.merge(message),
                None => {
                    merged.insert(&message.id, message.clone());
                }
            }
        }
    }
    merged.into_values().collect()
}
