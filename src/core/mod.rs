//! Extraction and tree-shaking engine.
//!
//! Two independent paths share the data types in `data`:
//!
//! 1. **Catalogs**: `catalog` scans sources with `extract`, merges the results
//!    with stored translations and persists them through `format`.
//! 2. **Tree-shaking**: `analyze` walks the import graph from each route entry
//!    (using `resolve`) and computes the namespaces each segment needs on the client.
//!
//! ## Module Structure
//!
//! - `accessor`: accessor imports, bindings and call shapes
//! - `analyze`: per-file facts, dependency graph, segment discovery and manifest builder
//! - `binding_context`: lexical scope stack for accessor bindings
//! - `catalog`: catalog manager and save scheduler
//! - `data`: messages, catalogs and manifest types
//! - `extract`: message extractor and call-site rewriting
//! - `format`: catalog file formats
//! - `key`: id generation
//! - `parsers`: swc parsing
//! - `resolve`: module specifier resolution
//! - `scanner`: source file discovery

pub mod accessor;
pub mod analyze;
pub mod binding_context;
pub mod catalog;
pub mod data;
pub mod extract;
pub mod format;
pub mod key;
pub mod parsers;
pub mod resolve;
pub mod scanner;

pub use accessor::{AccessorBinding, AccessorImports, CallShape, NamespaceArg};
pub use analyze::{SourceAnalyzer, SourceFacts, TreeShakingAnalyzer};
pub use binding_context::BindingContext;
pub use catalog::{CatalogManager, SaveScheduler};
pub use data::{
    Catalog, ExtractedMessage, Manifest, MessageReference, NAMESPACE_SEPARATOR, NamespaceNode,
    NamespaceTree, Namespaces, SegmentManifest, qualify_id, split_qualified_id,
};
pub use extract::{ExtractionResult, MessageExtractor};
pub use format::{CatalogCodec, CatalogFormat, Format, FormatKind};
pub use key::generate_key;
pub use parsers::{ParsedSource, parse_jsx_source};
pub use resolve::ModuleResolver;
pub use scanner::{ScanResult, is_source_file, scan_source_files};
