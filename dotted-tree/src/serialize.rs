//! Serialization and field projection

use crate::error::Result;
use crate::tree::DottedTree;
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// Top-level field projection applied by [`DottedTree::to_serializable`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Keep only these top-level keys
    pub only: Option<Vec<String>>,
    /// Drop these top-level keys (applied after `only`)
    pub except: Option<Vec<String>>,
}

impl SerializeOptions {
    /// Keep only the given keys
    pub fn only<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: Some(keys.into_iter().map(Into::into).collect()),
            except: None,
        }
    }

    /// Drop the given keys
    pub fn except<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            only: None,
            except: Some(keys.into_iter().map(Into::into).collect()),
        }
    }

    fn keeps(&self, key: &str) -> bool {
        let included = self
            .only
            .as_ref()
            .map_or(true, |only| only.iter().any(|k| k == key));
        let excluded = self
            .except
            .as_ref()
            .is_some_and(|except| except.iter().any(|k| k == key));
        included && !excluded
    }
}

impl DottedTree {
    /// Plain mapping with the requested projection applied
    pub fn to_serializable(&self, options: &SerializeOptions) -> Map<String, JsonValue> {
        let mut plain = self.to_plain();
        plain.retain(|key, _| options.keeps(key));
        plain
    }

    /// Compact JSON text of the whole tree
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty-printed JSON text of the whole tree
    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for DottedTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(key, value)| (key.as_str(), value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Limits;
    use serde_json::json;

    fn document() -> DottedTree {
        DottedTree::wrap(
            json!({"title": "Test", "author": {"name": "Kafka"}, "tags": [{"t": 1}, 2]}),
            Limits::default(),
        )
        .unwrap()
    }

    #[test]
    fn only_projects_top_level_keys() {
        let json = document().to_serializable(&SerializeOptions::only(["title"]));
        assert_eq!(json.get("title"), Some(&json!("Test")));
        assert!(json.get("author").is_none());
    }

    #[test]
    fn except_drops_keys() {
        let json = document().to_serializable(&SerializeOptions::except(["author", "tags"]));
        assert_eq!(JsonValue::Object(json), json!({"title": "Test"}));
    }

    #[test]
    fn default_options_keep_everything() {
        let doc = document();
        assert_eq!(doc.to_serializable(&SerializeOptions::default()), doc.to_plain());
    }

    #[test]
    fn serializes_in_insertion_order() {
        assert_eq!(
            document().to_json_string().unwrap(),
            r#"{"title":"Test","author":{"name":"Kafka"},"tags":[{"t":1},2]}"#
        );
    }

    #[test]
    fn pretty_text_parses_back_to_the_same_document() {
        let doc = document();
        let text = doc.to_json_string_pretty().unwrap();
        assert!(text.contains("\n  \"title\": \"Test\""));
        assert_eq!(serde_json::from_str::<JsonValue>(&text).unwrap(), doc.to_json_value());
    }
}
