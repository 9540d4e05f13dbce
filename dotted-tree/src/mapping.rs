//! Mapping-like inputs accepted by construction and merge

use crate::error::{Result, TreeError};
use crate::key::Key;
use crate::tree::DottedTree;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Anything that can produce an ordered sequence of key/value pairs
///
/// Construction and merge accept any implementor. Values that are not
/// mappings (for example a JSON string) fail with [`TreeError::InvalidInput`].
pub trait MappingLike {
    /// Produce the pairs in iteration order
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>>;
}

impl MappingLike for Map<String, JsonValue> {
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        Ok(self.into_iter().map(|(k, v)| (Key::from(k), v)).collect())
    }
}

impl MappingLike for &Map<String, JsonValue> {
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        Ok(self.iter().map(|(k, v)| (Key::from(k), v.clone())).collect())
    }
}

impl MappingLike for JsonValue {
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        match self {
            JsonValue::Object(map) => map.into_pairs(),
            other => Err(TreeError::InvalidInput {
                found: json_type_name(&other).to_string(),
            }),
        }
    }
}

impl MappingLike for &JsonValue {
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        match self {
            JsonValue::Object(map) => map.into_pairs(),
            other => Err(TreeError::InvalidInput {
                found: json_type_name(other).to_string(),
            }),
        }
    }
}

impl MappingLike for &DottedTree {
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        self.to_plain().into_pairs()
    }
}

impl MappingLike for DottedTree {
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        (&self).into_pairs()
    }
}

impl<K, V> MappingLike for BTreeMap<K, V>
where
    K: Into<Key>,
    V: Into<JsonValue>,
{
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        Ok(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V, S> MappingLike for HashMap<K, V, S>
where
    K: Into<Key>,
    V: Into<JsonValue>,
    S: BuildHasher,
{
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        Ok(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> MappingLike for Vec<(K, V)>
where
    K: Into<Key>,
    V: Into<JsonValue>,
{
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        Ok(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V, const N: usize> MappingLike for [(K, V); N]
where
    K: Into<Key>,
    V: Into<JsonValue>,
{
    fn into_pairs(self) -> Result<Vec<(Key, JsonValue)>> {
        Ok(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Get a human-readable type name for a JSON value
pub(crate) fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
