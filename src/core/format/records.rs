//! JSON catalogs of `{message, description}` records.
//!
//! Records are keyed by their local id. Namespaced ids are wrapped in an
//! object named after the whole namespace (not expanded per segment):
//!
//! ```json
//! {
//!   "+YJVTi": {"message": "Hey!"},
//!   "ui.button": {"OpKKos": {"message": "Hello!", "description": "Greeting"}}
//! }
//! ```

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::CatalogFormat;
use crate::core::{Catalog, ExtractedMessage, qualify_id, split_qualified_id};

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordsFormat;

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Record {
    fn into_message(self, id: String) -> ExtractedMessage {
        ExtractedMessage::new(id, self.message).with_description(self.description)
    }
}

fn is_record(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|map| map.get("message"))
        .is_some_and(Value::is_string)
}

impl CatalogFormat for RecordsFormat {
    fn extension(&self) -> &str {
        "json"
    }

    fn parse(&self, content: &str, locale: &str) -> Result<Catalog> {
        if content.trim().is_empty() {
            return Ok(Catalog::default());
        }

        let root: Map<String, Value> = serde_json::from_str(content)
            .with_context(|| format!("Invalid record catalog for locale '{}'", locale))?;

        let mut messages = Vec::new();
        for (key, value) in root {
            if is_record(&value) {
                let record: Record = serde_json::from_value(value)
                    .with_context(|| format!("Invalid record \"{}\"", key))?;
                messages.push(record.into_message(key));
                continue;
            }

            let Value::Object(records) = value else {
                bail!("Expected a record or a namespace object for \"{}\"", key);
            };
            for (id, value) in records {
                let qualified = qualify_id(Some(key.as_str()), &id);
                let record: Record = serde_json::from_value(value)
                    .with_context(|| format!("Invalid record \"{}\"", qualified))?;
                messages.push(record.into_message(qualified));
            }
        }

        Ok(Catalog::new(messages))
    }

    fn serialize(&self, catalog: &Catalog, _locale: &str) -> Result<String> {
        let mut root: IndexMap<String, Value> = IndexMap::new();
        for message in &catalog.messages {
            let record = serde_json::to_value(Record {
                message: message.message.clone(),
                description: message.description.clone(),
            })?;

            match split_qualified_id(&message.id) {
                (Some(namespace), id) => {
                    let wrapper = root
                        .entry(namespace.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(map) = wrapper {
                        map.insert(id.to_string(), record);
                    }
                }
                (None, id) => {
                    root.insert(id.to_string(), record);
                }
            }
        }

        let content = serde_json::to_string_pretty(&root).context("Failed to serialize records")?;
        Ok(format!("{}\n", content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_wraps_namespaces() {
        let catalog = Catalog::new(vec![
            ExtractedMessage::new("+YJVTi", "Hey!"),
            ExtractedMessage::new("ui.button.OpKKos", "Hello!")
                .with_description(Some("Greeting".to_string())),
        ]);

        let output = RecordsFormat.serialize(&catalog, "en").unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "+YJVTi": {"message": "Hey!"},
                "ui.button": {"OpKKos": {"message": "Hello!", "description": "Greeting"}}
            })
        );
    }

    #[test]
    fn test_parse_keeps_descriptions() {
        let content = r#"{"ui": {"OpKKos": {"message": "Hallo!", "description": "Greeting"}}}"#;
        let catalog = RecordsFormat.parse(content, "de").unwrap();
        assert_eq!(catalog.messages[0].id, "ui.OpKKos");
        assert_eq!(catalog.messages[0].description.as_deref(), Some("Greeting"));
    }

    #[test]
    fn test_parse_rejects_plain_strings() {
        let err = RecordsFormat.parse(r#"{"a": "b"}"#, "en").unwrap_err();
        assert!(err.to_string().contains("\"a\""));
    }
}
