//! Message extraction from source files.
//!
//! ## Module Structure
//!
//! - `message_extractor`: the extracting visitor and its content cache
//! - `rewrite`: span-based splicing of rewritten call sites

pub mod message_extractor;
pub mod rewrite;


pub use message_extractor::{ExtractionResult, MessageExtractor};
