//! intl-extractor - message extraction and tree-shaking for next-intl projects
//!
//! The library scans a Next.js source tree for translation calls, keeps the
//! per-locale message catalogs in sync with them, and computes which message
//! namespaces every route segment needs on the client.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and validation
//! - `core`: Extraction, catalog, format and tree-shaking engine
//! - `logging`: Logger installation for the binary

pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
