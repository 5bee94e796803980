use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, Globals, SourceMap, Span};
use swc_ecma_ast::Module;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

/// A parsed source file together with what is needed to map spans back to
/// byte offsets and lines of the original text.
pub struct ParsedSource {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    /// Position of the first parsed byte inside `source_map`.
    pub start_pos: BytePos,
    /// Bytes of the original text before the parsed text (a byte order mark).
    pub text_offset: usize,
}

impl ParsedSource {
    /// Byte range of a span inside the original text.
    pub fn byte_range(&self, span: Span) -> std::ops::Range<usize> {
        let lo = (span.lo.0 - self.start_pos.0) as usize + self.text_offset;
        let hi = (span.hi.0 - self.start_pos.0) as usize + self.text_offset;
        lo..hi
    }

    /// 1-indexed line of a span start.
    pub fn line(&self, span: Span) -> usize {
        self.source_map.lookup_char_pos(span.lo).line
    }
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Pick the swc syntax for a file from its extension.
///
/// `.ts`/`.mts`/`.cts` files are parsed without JSX so that `<T>value` casts work;
/// everything else goes through the TSX grammar, which accepts plain JavaScript too.
fn syntax_for(file_path: &str) -> Syntax {
    let extension = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extension {
        "ts" | "mts" | "cts" => Syntax::Typescript(TsSyntax {
            tsx: false,
            ..Default::default()
        }),
        "js" | "jsx" | "mjs" | "cjs" => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
        _ => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
    }
}

/// Parse JS/TS/JSX/TSX source code into an AST.
///
/// Each call gets its own `SourceMap`, so files can be parsed in parallel.
/// A leading byte order mark is not parsed; spans still map to offsets in
/// `code` through [`ParsedSource::byte_range`].
pub fn parse_jsx_source(code: String, file_path: &str) -> Result<ParsedSource> {
    use swc_common::GLOBALS;

    let (code, text_offset) = match code.strip_prefix(BYTE_ORDER_MARK) {
        Some(rest) => (rest.to_string(), BYTE_ORDER_MARK.len_utf8()),
        None => (code, 0),
    };
    let source_map = Arc::new(SourceMap::default());

    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let mut parser = Parser::new(
            syntax_for(file_path),
            StringInput::from(&*source_file),
            None,
        );
        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e))?;

        Ok(ParsedSource {
            module,
            start_pos: source_file.start_pos,
            text_offset,
            source_map: source_map.clone(),
        })
    })
}
