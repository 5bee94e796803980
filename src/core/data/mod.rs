//! Core data types shared by the extraction and tree-shaking paths.
//!
//! ## Module Structure
//!
//! - `message`: ExtractedMessage, MessageReference, Catalog and id helpers
//! - `manifest`: namespace trie and per-segment manifest types

pub mod manifest;
pub mod message;

pub use manifest::{Manifest, NamespaceNode, NamespaceTree, Namespaces, SegmentManifest};
pub use message::{
    Catalog, ExtractedMessage, MessageReference, NAMESPACE_SEPARATOR, qualify_id,
    split_qualified_id,
};
