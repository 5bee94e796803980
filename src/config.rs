use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::format::FormatKind;

pub const CONFIG_FILE_NAME: &str = ".intlrc.json";

/// How an accessor factory's return value is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    /// `t('Hello!')`: the argument is the source-language message.
    Extracted,
    /// `t('Common.title')`: the argument is a catalog key.
    Keyed,
}

/// A translation-accessor factory, e.g. `useExtracted` imported from `next-intl`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessorConfig {
    pub name: String,
    pub module: String,
    pub kind: AccessorKind,
}

impl AccessorConfig {
    pub fn new(name: &str, module: &str, kind: AccessorKind) -> Self {
        Self {
            name: name.to_string(),
            module: module.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalesKeyword {
    Infer,
}

/// Target locales: an explicit list, or `"infer"` from existing catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Locales {
    Keyword(LocalesKeyword),
    List(Vec<String>),
}

impl Default for Locales {
    fn default() -> Self {
        Locales::Keyword(LocalesKeyword::Infer)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_src_path")]
    pub src_path: Vec<String>,
    #[serde(default = "default_messages_path")]
    pub messages_path: String,
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    #[serde(default)]
    pub locales: Locales,
    #[serde(default)]
    pub format: FormatKind,
    #[serde(default)]
    pub ignores: Vec<String>,
    /// Path aliases with tsconfig `paths` semantics, relative to the project root.
    #[serde(default)]
    pub paths: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_app_dirs")]
    pub app_dirs: Vec<String>,
    #[serde(default = "default_accessors")]
    pub accessors: Vec<AccessorConfig>,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub development: bool,
    #[serde(default = "default_save_delay_ms")]
    pub save_delay_ms: u64,
}

fn default_src_path() -> Vec<String> {
    vec!["./src".to_string()]
}

fn default_messages_path() -> String {
    "./messages".to_string()
}

fn default_source_locale() -> String {
    "en".to_string()
}

fn default_app_dirs() -> Vec<String> {
    vec!["./src/app".to_string(), "./app".to_string()]
}

fn default_accessors() -> Vec<AccessorConfig> {
    vec![
        AccessorConfig::new("useExtracted", "next-intl", AccessorKind::Extracted),
        AccessorConfig::new("getExtracted", "next-intl/server", AccessorKind::Extracted),
        AccessorConfig::new("useTranslations", "next-intl", AccessorKind::Keyed),
        AccessorConfig::new("getTranslations", "next-intl/server", AccessorKind::Keyed),
    ]
}

fn default_provider() -> String {
    "NextIntlClientProvider".to_string()
}

fn default_save_delay_ms() -> u64 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_path: default_src_path(),
            messages_path: default_messages_path(),
            source_locale: default_source_locale(),
            locales: Locales::default(),
            format: FormatKind::default(),
            ignores: Vec::new(),
            paths: BTreeMap::new(),
            app_dirs: default_app_dirs(),
            accessors: default_accessors(),
            provider: default_provider(),
            development: false,
            save_delay_ms: default_save_delay_ms(),
        }
    }
}

/// Join a configured path onto the project root unless it is absolute.
pub fn resolve_against(root: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let relative = path.strip_prefix(".").unwrap_or(path);
    root.join(relative)
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern in `ignores` is invalid, the source
    /// locale is empty, or no accessor is configured.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.source_locale.trim().is_empty() {
            bail!("'sourceLocale' must not be empty");
        }

        if self.accessors.is_empty() {
            bail!("'accessors' must list at least one accessor");
        }

        for alias in self.paths.keys() {
            if alias.matches('*').count() > 1 {
                bail!(
                    "Invalid alias in 'paths': \"{}\" (at most one '*' is allowed)",
                    alias
                );
            }
        }

        Ok(())
    }

    pub fn source_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.src_path
            .iter()
            .map(|p| resolve_against(root, p))
            .collect()
    }

    pub fn messages_dir(&self, root: &Path) -> PathBuf {
        resolve_against(root, &self.messages_path)
    }

    /// Configured app directories that exist on disk.
    pub fn existing_app_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.app_dirs
            .iter()
            .map(|p| resolve_against(root, p))
            .filter(|p| p.is_dir())
            .collect()
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
