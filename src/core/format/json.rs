//! Nested key/value JSON catalogs.
//!
//! Dotted ids are expanded one namespace segment at a time:
//! `"ui.button.save"` is stored as `{"ui": {"button": {"save": "..."}}}`.
//! References and descriptions are not persisted in this format.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use super::CatalogFormat;
use crate::core::{Catalog, ExtractedMessage, NAMESPACE_SEPARATOR};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl CatalogFormat for JsonFormat {
    fn extension(&self) -> &str {
        "json"
    }

    fn parse(&self, content: &str, locale: &str) -> Result<Catalog> {
        if content.trim().is_empty() {
            return Ok(Catalog::default());
        }

        let json: Value = serde_json::from_str(content)
            .with_context(|| format!("Invalid JSON in catalog for locale '{}'", locale))?;
        let Value::Object(map) = json else {
            bail!("Root of the '{}' catalog must be an object", locale);
        };

        let mut messages = Vec::new();
        flatten_json(&map, String::new(), &mut messages)?;
        Ok(Catalog::new(messages))
    }

    fn serialize(&self, catalog: &Catalog, _locale: &str) -> Result<String> {
        let mut root = Map::new();
        for message in &catalog.messages {
            let parts: Vec<&str> = message.id.split(NAMESPACE_SEPARATOR).collect();
            insert_nested(&mut root, &parts, Value::String(message.message.clone()));
        }

        let content =
            serde_json::to_string_pretty(&Value::Object(root)).context("Failed to serialize JSON")?;
        Ok(format!("{}\n", content))
    }
}

fn flatten_json(
    map: &Map<String, Value>,
    prefix: String,
    result: &mut Vec<ExtractedMessage>,
) -> Result<()> {
    for (key, value) in map {
        let id = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, key)
        };

        match value {
            Value::Object(nested) => flatten_json(nested, id, result)?,
            Value::String(s) => result.push(ExtractedMessage::new(id, s.clone())),
            other => bail!(
                "Unsupported value for \"{}\": expected a string or an object, found {}",
                id,
                other
            ),
        }
    }
    Ok(())
}

/// Insert a value at a nested path, creating intermediate objects as needed.
///
/// A string sitting where an intermediate object is needed gets replaced.
fn insert_nested(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        root.insert(first.to_string(), value);
        return;
    }

    let next_level = root
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));

    if !next_level.is_object() {
        *next_level = Value::Object(Map::new());
    }

    if let Value::Object(inner) = next_level {
        insert_nested(inner, rest, value);
    }
}
