//! Source file parsing.
//!
//! - `jsx`: JS/TS/JSX/TSX parser (uses swc for AST generation)

pub mod jsx;

pub use jsx::{ParsedSource, parse_jsx_source};
