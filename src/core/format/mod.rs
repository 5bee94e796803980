//! Catalog file formats.
//!
//! Every format implements [`CatalogFormat`]: it turns file content into a
//! [`Catalog`] and back. [`CatalogCodec`] adds the on-disk layout
//! (`<messages_path>/<locale>.<extension>`) on top of a format.
//!
//! ## Module Structure
//!
//! - `json`: nested key/value documents (`{"ui": {"OpKKos": "Hello!"}}`)
//! - `po`: restricted gettext PO files
//! - `records`: `{message, description}` records grouped by namespace

pub mod json;
pub mod po;
pub mod records;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::core::Catalog;

pub use json::JsonFormat;
pub use po::PoFormat;
pub use records::RecordsFormat;

/// Conversion between catalog file content and [`Catalog`].
#[enum_dispatch]
pub trait CatalogFormat {
    /// File extension without the leading dot.
    fn extension(&self) -> &str;

    /// Parse file content. `locale` is only used for diagnostics and metadata.
    fn parse(&self, content: &str, locale: &str) -> Result<Catalog>;

    /// Render a catalog as the full file content.
    fn serialize(&self, catalog: &Catalog, locale: &str) -> Result<String>;
}

/// A user-supplied format, shared behind an `Arc`.
#[derive(Clone)]
pub struct CustomFormat(Arc<dyn CatalogFormat + Send + Sync>);

impl CustomFormat {
    pub fn new(format: impl CatalogFormat + Send + Sync + 'static) -> Self {
        Self(Arc::new(format))
    }
}

impl fmt::Debug for CustomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomFormat")
            .field(&self.0.extension())
            .finish()
    }
}

impl CatalogFormat for CustomFormat {
    fn extension(&self) -> &str {
        self.0.extension()
    }

    fn parse(&self, content: &str, locale: &str) -> Result<Catalog> {
        self.0.parse(content, locale)
    }

    fn serialize(&self, catalog: &Catalog, locale: &str) -> Result<String> {
        self.0.serialize(catalog, locale)
    }
}

/// The active catalog format.
#[enum_dispatch(CatalogFormat)]
#[derive(Debug, Clone)]
pub enum Format {
    Json(JsonFormat),
    Po(PoFormat),
    Records(RecordsFormat),
    Custom(CustomFormat),
}

/// Built-in formats selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    #[default]
    Json,
    Po,
    Records,
}

impl From<FormatKind> for Format {
    fn from(kind: FormatKind) -> Self {
        match kind {
            FormatKind::Json => Format::Json(JsonFormat),
            FormatKind::Po => Format::Po(PoFormat),
            FormatKind::Records => Format::Records(RecordsFormat),
        }
    }
}

/// Reads and writes per-locale catalog files in one directory.
#[derive(Debug, Clone)]
pub struct CatalogCodec {
    messages_path: PathBuf,
    format: Format,
}

impl CatalogCodec {
    pub fn new(messages_path: impl Into<PathBuf>, format: impl Into<Format>) -> Self {
        Self {
            messages_path: messages_path.into(),
            format: format.into(),
        }
    }

    pub fn messages_path(&self) -> &Path {
        &self.messages_path
    }

    pub fn extension(&self) -> &str {
        self.format.extension()
    }

    pub fn file_path(&self, locale: &str) -> PathBuf {
        self.messages_path
            .join(format!("{}.{}", locale, self.format.extension()))
    }

    /// Read the catalog of a locale. A missing file is an empty catalog.
    pub fn read(&self, locale: &str) -> Result<Catalog> {
        let path = self.file_path(locale);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Catalog::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read catalog: {}", path.display()));
            }
        };

        self.format
            .parse(&content, locale)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))
    }

    /// Overwrite the catalog file of a locale, creating directories as needed.
    pub fn write(&self, locale: &str, catalog: &Catalog) -> Result<()> {
        let path = self.file_path(locale);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = self.format.serialize(catalog, locale)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write catalog: {}", path.display()))
    }

    /// Locales that currently have a catalog file, sorted.
    pub fn discover_locales(&self) -> Result<Vec<String>> {
        if !self.messages_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut locales = Vec::new();
        let entries = fs::read_dir(&self.messages_path).with_context(|| {
            format!(
                "Failed to read messages directory: {}",
                self.messages_path.display()
            )
        })?;
        for entry in entries {
            let path = entry?.path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(self.format.extension())
                && let Some(locale) = path.file_stem().and_then(|s| s.to_str())
            {
                locales.push(locale.to_string());
            }
        }
        locales.sort();
        Ok(locales)
    }
}
