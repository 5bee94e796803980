use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;

/// Separator between namespace segments and the message id.
pub const NAMESPACE_SEPARATOR: char = '.';

/// A call site that contributes a message to the catalog.
///
/// The derived ordering compares `path` first and then `line`, which is the
/// order references are persisted in (`#:` comments, reference lists).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageReference {
    /// Path relative to the project root, always with `/` separators.
    pub path: String,
    /// Line number (1-indexed).
    pub line: Option<usize>,
}

impl MessageReference {
    pub fn new(path: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl fmt::Display for MessageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.path, line),
            None => write!(f, "{}", self.path),
        }
    }
}

/// A message extracted from source code (or read back from a catalog).
///
/// `id` is always the fully-qualified id: `namespace.id` when the accessor was
/// created with a namespace, otherwise just the generated or explicit id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMessage {
    pub id: String,
    /// Source-language text. ICU syntax, treated as opaque.
    pub message: String,
    pub description: Option<String>,
    /// Deduplicated by `(path, line)` and kept sorted.
    pub references: BTreeSet<MessageReference>,
}

impl ExtractedMessage {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            description: None,
            references: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_reference(mut self, reference: MessageReference) -> Self {
        self.references.insert(reference);
        self
    }

    /// Namespace part of the id (everything up to the last separator).
    pub fn namespace(&self) -> Option<&str> {
        split_qualified_id(&self.id).0
    }

    /// Id without its namespace.
    pub fn local_id(&self) -> &str {
        split_qualified_id(&self.id).1
    }

    /// Merge another occurrence of the same id into this one.
    ///
    /// References are unioned. The first non-empty description is kept.
    pub fn merge(&mut self, other: &ExtractedMessage) {
        self.references.extend(other.references.iter().cloned());
        if self.description.is_none() {
            self.description = other.description.clone();
        }
    }
}

/// Build a fully-qualified id from an optional namespace and a local id.
///
/// ```
/// use intl_extractor::core::qualify_id;
///
/// assert_eq!(qualify_id(Some("ui"), "OpKKos"), "ui.OpKKos");
/// assert_eq!(qualify_id(None, "OpKKos"), "OpKKos");
/// assert_eq!(qualify_id(Some(""), "OpKKos"), "OpKKos");
/// ```
pub fn qualify_id(namespace: Option<&str>, id: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}{}{}", ns, NAMESPACE_SEPARATOR, id),
        _ => id.to_string(),
    }
}

/// Split a fully-qualified id at the last namespace separator.
///
/// ```
/// use intl_extractor::core::split_qualified_id;
///
/// assert_eq!(split_qualified_id("ui.button.save"), (Some("ui.button"), "save"));
/// assert_eq!(split_qualified_id("+YJVTi"), (None, "+YJVTi"));
/// ```
pub fn split_qualified_id(id: &str) -> (Option<&str>, &str) {
    match id.rfind(NAMESPACE_SEPARATOR) {
        Some(pos) => (Some(&id[..pos]), &id[pos + 1..]),
        None => (None, id),
    }
}

/// The full set of messages for one locale, plus optional metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Header entries (only the PO format carries these).
    pub meta: IndexMap<String, String>,
    pub messages: Vec<ExtractedMessage>,
}

impl Catalog {
    pub fn new(messages: Vec<ExtractedMessage>) -> Self {
        Self {
            meta: IndexMap::new(),
            messages,
        }
    }

    pub fn with_meta(mut self, meta: IndexMap<String, String>) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ExtractedMessage> {
        self.messages.iter().find(|m| m.id == id)
    }
}
