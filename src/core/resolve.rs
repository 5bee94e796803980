//! Resolution of import specifiers to source files.
//!
//! Relative specifiers are resolved against the importing file; aliased
//! specifiers (`@/components/Button`) through the configured `paths` map,
//! longest prefix first. Bare package specifiers and anything resolving
//! outside the source roots yield `None`.

use std::path::{Component, Path, PathBuf};

use log::trace;

use crate::config::{Config, resolve_against};
use crate::core::scanner::{SOURCE_EXTENSIONS, is_source_file};

/// A `paths` entry split around its optional `*` wildcard.
#[derive(Debug, Clone)]
struct AliasPattern {
    prefix: String,
    /// `None` for exact patterns without a wildcard.
    suffix: Option<String>,
    targets: Vec<String>,
}

impl AliasPattern {
    fn new(pattern: &str, targets: &[String]) -> Self {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => Self {
                prefix: prefix.to_string(),
                suffix: Some(suffix.to_string()),
                targets: targets.to_vec(),
            },
            None => Self {
                prefix: pattern.to_string(),
                suffix: None,
                targets: targets.to_vec(),
            },
        }
    }

    /// The text matched by `*`, or `""` for exact patterns.
    fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        match &self.suffix {
            None => (specifier == self.prefix).then_some(""),
            Some(suffix) => specifier
                .strip_prefix(self.prefix.as_str())?
                .strip_suffix(suffix.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: PathBuf,
    source_roots: Vec<PathBuf>,
    aliases: Vec<AliasPattern>,
}

impl ModuleResolver {
    /// `aliases` maps patterns to targets relative to `root`.
    pub fn new<'a>(
        root: &Path,
        source_roots: Vec<PathBuf>,
        aliases: impl IntoIterator<Item = (&'a String, &'a Vec<String>)>,
    ) -> Self {
        let mut aliases: Vec<AliasPattern> = aliases
            .into_iter()
            .map(|(pattern, targets)| AliasPattern::new(pattern, targets))
            .collect();
        aliases.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Self {
            root: root.to_path_buf(),
            source_roots: source_roots.iter().map(|p| normalize(p)).collect(),
            aliases,
        }
    }

    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(root, config.source_dirs(root), &config.paths)
    }

    /// Resolve `specifier` as imported from `from_file`.
    pub fn resolve(&self, from_file: &Path, specifier: &str) -> Option<PathBuf> {
        let resolved = self.candidates(from_file, specifier).into_iter().find_map(|base| {
            let base = normalize(&base);
            if !self.is_inside_source_roots(&base) {
                return None;
            }
            probe(&base)
        });

        if resolved.is_none() {
            trace!(
                "Unresolved import '{}' from {}",
                specifier,
                from_file.display()
            );
        }
        resolved
    }

    fn candidates(&self, from_file: &Path, specifier: &str) -> Vec<PathBuf> {
        if is_relative(specifier) {
            return from_file
                .parent()
                .map(|dir| vec![dir.join(specifier)])
                .unwrap_or_default();
        }
        if Path::new(specifier).is_absolute() {
            return vec![PathBuf::from(specifier)];
        }

        for alias in &self.aliases {
            if let Some(captured) = alias.capture(specifier) {
                return alias
                    .targets
                    .iter()
                    .map(|target| resolve_against(&self.root, &target.replacen('*', captured, 1)))
                    .collect();
            }
        }
        Vec::new()
    }

    fn is_inside_source_roots(&self, path: &Path) -> bool {
        self.source_roots.iter().any(|root| path.starts_with(root))
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Lexically remove `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// TypeScript sources that may stand behind a JavaScript specifier
/// (`./util.js` importing `util.ts`).
fn typescript_counterparts(extension: &str) -> &'static [&'static str] {
    match extension {
        "js" => &["ts", "tsx"],
        "jsx" => &["tsx"],
        "mjs" => &["mts"],
        "cjs" => &["cts"],
        _ => &[],
    }
}

fn append_extension(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Find the file behind a base path: the file itself, `base.<ext>`, a
/// TypeScript counterpart of a `.js` path, or `base/index.<ext>`.
fn probe(base: &Path) -> Option<PathBuf> {
    if base.is_file() && is_source_file(base) {
        return Some(base.to_path_buf());
    }

    if let Some(extension) = base.extension().and_then(|e| e.to_str()) {
        for counterpart in typescript_counterparts(extension) {
            let candidate = base.with_extension(counterpart);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    let with_extension = SOURCE_EXTENSIONS
        .iter()
        .map(|ext| append_extension(base, ext))
        .find(|candidate| candidate.is_file() && is_source_file(candidate));
    if with_extension.is_some() {
        return with_extension;
    }

    if base.is_dir() {
        return SOURCE_EXTENSIONS
            .iter()
            .map(|ext| base.join(format!("index.{}", ext)))
            .find(|candidate| candidate.is_file());
    }

    None
}
