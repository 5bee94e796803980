//! Logger setup for the binary.
//!
//! With `INTL_EXTRACTOR_DEBUG` set, every record at debug level and above is
//! appended to `intl-extractor.log` in the project root as one JSON object per
//! line. Otherwise warnings go to stderr, and `RUST_LOG` can override the level.

use std::{
    env,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use serde_json::json;

pub const DEBUG_ENV_VAR: &str = "INTL_EXTRACTOR_DEBUG";
pub const LOG_FILE_NAME: &str = "intl-extractor.log";

/// Whether a value of [`DEBUG_ENV_VAR`] turns debug logging on.
pub fn is_debug_value(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

pub fn debug_enabled() -> bool {
    env::var(DEBUG_ENV_VAR).is_ok_and(|v| is_debug_value(&v))
}

pub fn log_file_path(root: &Path) -> PathBuf {
    root.join(LOG_FILE_NAME)
}

/// Install the global logger. `verbose` raises the stderr level to `info`.
///
/// Calling this twice is harmless: the second logger is not installed.
pub fn init(root: &Path, verbose: bool) -> Result<()> {
    let mut builder = Builder::new();

    if debug_enabled() {
        let path = log_file_path(root);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        builder
            .filter_level(LevelFilter::Debug)
            .format(|buf, record| {
                let line = json!({
                    "ts": buf.timestamp_millis().to_string(),
                    "level": record.level().as_str(),
                    "target": record.target(),
                    "msg": record.args().to_string(),
                });
                writeln!(buf, "{}", line)
            })
            .target(Target::Pipe(Box::new(file)));
    } else {
        let level = if verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        };
        builder
            .filter_level(level)
            .parse_env(Env::default())
            .format_timestamp(None)
            .format_target(false);
    }

    let _ = builder.try_init();
    Ok(())
}
