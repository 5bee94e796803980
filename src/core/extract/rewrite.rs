//! Span-based text splicing.
//!
//! An [`Edit`] replaces a byte range of the original text. Its replacement may
//! embed other ranges of the original (`Piece::Original`), which are rendered
//! with the edits nested inside them, so rewriting `t('a', {x: t('b')})`
//! rewrites both calls.

use std::ops::Range;

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Literal(String),
    Original(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub pieces: Vec<Piece>,
}

/// Apply non-overlapping (or properly nested) edits to `source`.
///
/// Fails if an edit does not fall on character boundaries of `source`.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> Result<String> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }
    edits.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });
    render(source, 0..source.len(), &edits)
}

fn slice(source: &str, range: Range<usize>) -> Result<&str> {
    source
        .get(range.clone())
        .ok_or_else(|| anyhow!("Edit range {:?} does not fit the source text", range))
}

fn render(source: &str, range: Range<usize>, edits: &[Edit]) -> Result<String> {
    let mut output = String::with_capacity(range.len());
    let mut cursor = range.start;

    for edit in edits {
        if edit.range.start < cursor || edit.range.end > range.end {
            continue;
        }
        output.push_str(slice(source, cursor..edit.range.start)?);
        for piece in &edit.pieces {
            match piece {
                Piece::Literal(text) => output.push_str(text),
                Piece::Original(inner) => output.push_str(&render(source, inner.clone(), edits)?),
            }
        }
        cursor = edit.range.end;
    }

    output.push_str(slice(source, cursor..range.end)?);
    Ok(output)
}
