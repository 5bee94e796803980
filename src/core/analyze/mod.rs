//! Tree-shaking analysis.
//!
//! ## Module Structure
//!
//! - `source_analyzer`: per-file directives, imports and accessor usages (cached)
//! - `graph`: lazily expanded import graph
//! - `segments`: route entry discovery and segment ids
//! - `manifest`: the per-segment walk and provider ownership

pub mod graph;
pub mod manifest;
pub mod segments;
pub mod source_analyzer;

#[cfg(test)]
mod tests;

pub use graph::DependencyGraph;
pub use manifest::TreeShakingAnalyzer;
pub use segments::{EntryKind, RouteEntry, Segment, discover_segments};
pub use source_analyzer::{AccessorUsage, SourceAnalyzer, SourceFacts, UsageKey, analyze_source};
