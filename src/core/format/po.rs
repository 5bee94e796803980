//! A restricted gettext PO format.
//!
//! Each message is one block:
//!
//! ```text
//! #: src/components/Button.tsx:12
//! #. Label of the primary action
//! msgctxt "ui"
//! msgid "OpKKos"
//! msgstr "Hello!"
//! ```
//!
//! `msgctxt` holds the namespace (everything in the id before the last `.`),
//! `msgid` the local id and `msgstr` the message. A first block with an empty
//! `msgid` is the header; its quoted `"Key: value\n"` lines become metadata.
//!
//! Plurals, translator comments (`#`), flags (`#,`), previous-id comments
//! (`#|`), obsolete entries (`#~`) and multi-line strings outside the header
//! are rejected with an error that quotes the offending line.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use indexmap::IndexMap;
use regex::Regex;

use super::CatalogFormat;
use crate::core::{Catalog, ExtractedMessage, MessageReference, qualify_id, split_qualified_id};

const GENERATOR: &str = "intl-extractor";

/// Header keys written before any preserved metadata, in this order.
const HEADER_KEYS: [&str; 4] = [
    "Language",
    "Content-Type",
    "Content-Transfer-Encoding",
    "X-Generator",
];

/// `path:line` or `path:line:column` at the end of a reference token.
static REFERENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<path>.+?):(?P<line>\d+)(?::(?P<column>\d+))?$").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct PoFormat;

impl CatalogFormat for PoFormat {
    fn extension(&self) -> &str {
        "po"
    }

    fn parse(&self, content: &str, _locale: &str) -> Result<Catalog> {
        PoParser::default().parse(content)
    }

    fn serialize(&self, catalog: &Catalog, locale: &str) -> Result<String> {
        let mut blocks = vec![serialize_header(&catalog.meta, locale)];
        blocks.extend(catalog.messages.iter().map(serialize_entry));
        Ok(format!("{}\n", blocks.join("\n\n")))
    }
}

/// Keyword that opened the most recent quoted string of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Msgctxt,
    Msgid,
    Msgstr,
}

impl Keyword {
    fn as_str(self) -> &'static str {
        match self {
            Keyword::Msgctxt => "msgctxt",
            Keyword::Msgid => "msgid",
            Keyword::Msgstr => "msgstr",
        }
    }
}

#[derive(Debug, Default)]
struct PendingEntry {
    references: Vec<MessageReference>,
    description: Vec<String>,
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgstr: Option<String>,
    last_keyword: Option<Keyword>,
    /// First line of the entry, quoted in incomplete-entry errors.
    first_line: Option<String>,
}

impl PendingEntry {
    fn is_empty(&self) -> bool {
        self.first_line.is_none()
    }

    fn is_header_candidate(&self) -> bool {
        self.msgctxt.is_none() && self.msgid.as_deref() == Some("")
    }
}

#[derive(Debug, Default)]
struct PoParser {
    entry: PendingEntry,
    finished_entries: usize,
    meta: IndexMap<String, String>,
    messages: Vec<ExtractedMessage>,
}

impl PoParser {
    fn parse(mut self, content: &str) -> Result<Catalog> {
        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                self.finish_entry()?;
                continue;
            }
            self.parse_line(line)?;
        }
        self.finish_entry()?;

        Ok(Catalog::new(self.messages).with_meta(self.meta))
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if self.entry.first_line.is_none() {
            self.entry.first_line = Some(line.to_string());
        }

        if let Some(rest) = line.strip_prefix("#:") {
            for token in rest.split_whitespace() {
                self.entry.references.push(parse_reference(token, line)?);
            }
            return Ok(());
        }
        if let Some(rest) = line.strip_prefix("#.") {
            self.entry.description.push(rest.trim().to_string());
            return Ok(());
        }
        if line.starts_with("#,") {
            bail!("Flag comments are not supported in line: {}", line);
        }
        if line.starts_with("#|") {
            bail!("Previous-id comments are not supported in line: {}", line);
        }
        if line.starts_with("#~") {
            bail!("Obsolete entries are not supported in line: {}", line);
        }
        if line.starts_with('#') {
            bail!("Translator comments are not supported in line: {}", line);
        }
        if line.starts_with("msgid_plural") {
            bail!("Unsupported \"msgid_plural\" in line: {}", line);
        }
        if line.starts_with("msgstr[") {
            bail!("Plural forms are not supported in line: {}", line);
        }
        if let Some(rest) = line.strip_prefix("msgctxt") {
            return self.set_keyword(Keyword::Msgctxt, rest, line);
        }
        if let Some(rest) = line.strip_prefix("msgid") {
            return self.set_keyword(Keyword::Msgid, rest, line);
        }
        if let Some(rest) = line.strip_prefix("msgstr") {
            return self.set_keyword(Keyword::Msgstr, rest, line);
        }
        if line.starts_with('"') {
            return self.continue_string(line);
        }

        bail!("Unexpected line: {}", line)
    }

    fn set_keyword(&mut self, keyword: Keyword, rest: &str, line: &str) -> Result<()> {
        if !rest.starts_with(char::is_whitespace) {
            bail!("Unexpected line: {}", line);
        }
        let value = parse_quoted(rest, line)?;

        let slot = match keyword {
            Keyword::Msgctxt => &mut self.entry.msgctxt,
            Keyword::Msgid => &mut self.entry.msgid,
            Keyword::Msgstr => &mut self.entry.msgstr,
        };
        if slot.is_some() {
            bail!("Duplicate \"{}\" in line: {}", keyword.as_str(), line);
        }
        *slot = Some(value);
        self.entry.last_keyword = Some(keyword);
        Ok(())
    }

    /// Quoted continuation line. Only the header's `msgstr` may span lines.
    fn continue_string(&mut self, line: &str) -> Result<()> {
        let in_header = self.finished_entries == 0
            && self.entry.is_header_candidate()
            && self.entry.last_keyword == Some(Keyword::Msgstr);
        if !in_header {
            bail!("Multi-line strings are not supported in line: {}", line);
        }

        let value = parse_quoted(line, line)?;
        if let Some(msgstr) = self.entry.msgstr.as_mut() {
            msgstr.push_str(&value);
        }
        Ok(())
    }

    fn finish_entry(&mut self) -> Result<()> {
        let entry = std::mem::take(&mut self.entry);
        if entry.is_empty() {
            return Ok(());
        }
        let is_first = self.finished_entries == 0;
        self.finished_entries += 1;

        let first_line = entry.first_line.clone().unwrap_or_default();
        let (Some(msgid), Some(msgstr)) = (entry.msgid.as_ref(), entry.msgstr.as_ref()) else {
            let missing = if entry.msgid.is_none() {
                "msgid"
            } else {
                "msgstr"
            };
            bail!(
                "Incomplete entry: missing \"{}\" in entry starting at line: {}",
                missing,
                first_line
            );
        };

        if is_first && entry.is_header_candidate() {
            for header_line in msgstr.split('\n') {
                if let Some((key, value)) = header_line.split_once(':') {
                    self.meta
                        .insert(key.trim().to_string(), value.trim().to_string());
                }
            }
            return Ok(());
        }

        let description = if entry.description.is_empty() {
            None
        } else {
            Some(entry.description.join("\n"))
        };

        let mut message = ExtractedMessage::new(
            qualify_id(entry.msgctxt.as_deref(), msgid),
            msgstr.clone(),
        )
        .with_description(description);
        message.references.extend(entry.references);
        self.messages.push(message);
        Ok(())
    }
}

/// Parse a `path[:line]` reference. Column numbers are rejected.
fn parse_reference(token: &str, line: &str) -> Result<MessageReference> {
    let Some(captures) = REFERENCE_REGEX.captures(token) else {
        return Ok(MessageReference::new(token, None));
    };
    if captures.name("column").is_some() {
        bail!("Column numbers are not supported in references: {}", line);
    }

    let path = &captures["path"];
    let line_number = captures["line"]
        .parse::<usize>()
        .map_err(|_| anyhow::anyhow!("Invalid line number in reference: {}", line))?;
    Ok(MessageReference::new(path, Some(line_number)))
}

/// Parse a single double-quoted PO string, resolving escapes.
fn parse_quoted(input: &str, line: &str) -> Result<String> {
    let input = input.trim();
    let Some(body) = input.strip_prefix('"') else {
        bail!("Expected a quoted string in line: {}", line);
    };

    let mut value = String::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if !chars.as_str().trim().is_empty() {
                    bail!("Unexpected content after string in line: {}", line);
                }
                return Ok(value);
            }
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('"') => value.push('"'),
                Some('\\') => value.push('\\'),
                Some(other) => bail!("Unknown escape sequence \\{} in line: {}", other, line),
                None => break,
            },
            other => value.push(other),
        }
    }

    bail!("Unterminated string in line: {}", line)
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn serialize_header(meta: &IndexMap<String, String>, locale: &str) -> String {
    let defaults = [
        locale,
        "text/plain; charset=utf-8",
        "8bit",
        GENERATOR,
    ];

    let mut lines = vec!["msgid \"\"".to_string(), "msgstr \"\"".to_string()];
    for (key, default) in HEADER_KEYS.iter().zip(defaults) {
        let value = match *key {
            "Language" => locale,
            _ => meta.get(*key).map(String::as_str).unwrap_or(default),
        };
        lines.push(format!("\"{}: {}\\n\"", key, escape(value)));
    }
    for (key, value) in meta {
        if !HEADER_KEYS.contains(&key.as_str()) {
            lines.push(format!("\"{}: {}\\n\"", key, escape(value)));
        }
    }
    lines.join("\n")
}

fn serialize_entry(message: &ExtractedMessage) -> String {
    let mut lines = Vec::new();
    for reference in &message.references {
        lines.push(format!("#: {}", reference));
    }
    if let Some(description) = &message.description {
        for description_line in description.lines() {
            lines.push(format!("#. {}", description_line));
        }
    }

    let (namespace, id) = split_qualified_id(&message.id);
    if let Some(namespace) = namespace {
        lines.push(format!("msgctxt \"{}\"", escape(namespace)));
    }
    lines.push(format!("msgid \"{}\"", escape(id)));
    lines.push(format!("msgstr \"{}\"", escape(&message.message)));
    lines.join("\n")
}
