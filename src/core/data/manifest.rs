use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::message::NAMESPACE_SEPARATOR;

/// A node of the namespace trie.
///
/// `Required` is a leaf: either a single required id, or (one level up) a whole
/// namespace whose every message must ship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceNode {
    Required,
    Nested(NamespaceTree),
}

impl NamespaceNode {
    fn merge(&mut self, other: &NamespaceNode) {
        match other {
            NamespaceNode::Required => *self = NamespaceNode::Required,
            NamespaceNode::Nested(other_tree) => {
                if let NamespaceNode::Nested(tree) = self {
                    tree.merge(other_tree);
                }
            }
        }
    }
}

impl Serialize for NamespaceNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NamespaceNode::Required => serializer.serialize_bool(true),
            NamespaceNode::Nested(tree) => tree.serialize(serializer),
        }
    }
}

/// Nested boolean trie of required namespaces and ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NamespaceTree(BTreeMap<String, NamespaceNode>);

impl NamespaceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mark a dotted path (`"ui.button.save"`) as required.
    ///
    /// A path below an already required node is a no-op; marking a node that
    /// has children replaces the children.
    pub fn insert_path(&mut self, path: &str) {
        let segments: Vec<&str> = path.split(NAMESPACE_SEPARATOR).collect();
        self.insert_segments(&segments);
    }

    fn insert_segments(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };

        if rest.is_empty() {
            self.0.insert(first.to_string(), NamespaceNode::Required);
            return;
        }

        let node = self
            .0
            .entry(first.to_string())
            .or_insert_with(|| NamespaceNode::Nested(NamespaceTree::new()));

        if let NamespaceNode::Nested(tree) = node {
            tree.insert_segments(rest);
        }
    }

    /// Union another trie into this one.
    pub fn merge(&mut self, other: &NamespaceTree) {
        for (key, other_node) in &other.0 {
            match self.0.get_mut(key) {
                Some(node) => node.merge(other_node),
                None => {
                    self.0.insert(key.clone(), other_node.clone());
                }
            }
        }
    }

    /// Whether the given dotted path is covered by the trie.
    pub fn contains(&self, path: &str) -> bool {
        let mut current = self;
        for segment in path.split(NAMESPACE_SEPARATOR) {
            match current.0.get(segment) {
                Some(NamespaceNode::Required) => return true,
                Some(NamespaceNode::Nested(tree)) => current = tree,
                None => return false,
            }
        }
        false
    }
}

/// Namespaces a segment must ship to client code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespaces {
    /// Every message is required (dynamic usage somewhere in client code).
    All,
    Tree(NamespaceTree),
}

impl Default for Namespaces {
    fn default() -> Self {
        Namespaces::Tree(NamespaceTree::new())
    }
}

impl Namespaces {
    pub fn is_all(&self) -> bool {
        matches!(self, Namespaces::All)
    }

    pub fn merge(&mut self, other: &Namespaces) {
        match other {
            Namespaces::All => *self = Namespaces::All,
            Namespaces::Tree(other_tree) => {
                if let Namespaces::Tree(tree) = self {
                    tree.merge(other_tree);
                }
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        match self {
            Namespaces::All => true,
            Namespaces::Tree(tree) => tree.contains(path),
        }
    }
}

impl Serialize for Namespaces {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Namespaces::All => serializer.serialize_bool(true),
            Namespaces::Tree(tree) => tree.serialize(serializer),
        }
    }
}

/// Manifest entry for one routed segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentManifest {
    pub has_layout_provider: bool,
    pub namespaces: Namespaces,
}

/// Segment id → required namespaces, ordered ancestors first.
pub type Manifest = IndexMap<String, SegmentManifest>;
