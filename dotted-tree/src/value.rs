//! Values stored in a tree

use crate::tree::DottedTree;
use serde::ser::{Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};

/// A value held under a tree attribute
///
/// Scalars pass through from the source document unchanged. Mappings become
/// nested [`DottedTree`] nodes and arrays become sequences whose mapping
/// elements are nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Numeric scalar
    Number(Number),
    /// String scalar
    String(String),
    /// Ordered list, possibly containing nodes
    Sequence(Vec<Value>),
    /// Nested mapping level
    Node(DottedTree),
}

/// Shared null returned for missing reads
pub(crate) static NULL: Value = Value::Null;

impl Value {
    /// Returns true for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Everything except `Null` and `Bool(false)` is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Borrow the string if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean if this is a boolean scalar
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the number as `i64` if it fits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get the number as `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Borrow the nested node
    pub fn as_node(&self) -> Option<&DottedTree> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Borrow the sequence elements
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to a plain JSON value with no tree types left
    pub fn to_plain(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => JsonValue::Number(n.clone()),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Sequence(items) => JsonValue::Array(items.iter().map(Value::to_plain).collect()),
            Value::Node(node) => JsonValue::Object(node.to_plain()),
        }
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        value.to_plain()
    }
}

impl PartialEq<JsonValue> for Value {
    fn eq(&self, other: &JsonValue) -> bool {
        match (self, other) {
            (Value::Null, JsonValue::Null) => true,
            (Value::Bool(a), JsonValue::Bool(b)) => a == b,
            (Value::Number(a), JsonValue::Number(b)) => a == b,
            (Value::String(a), JsonValue::String(b)) => a == b,
            (Value::Sequence(a), JsonValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
            }
            (Value::Node(node), JsonValue::Object(map)) => node == map,
            _ => false,
        }
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => serializer.collect_seq(items),
            Value::Node(node) => node.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_null_and_false() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.into()).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn scalars_compare_with_json() {
        assert_eq!(Value::String("Kafka".into()), json!("Kafka"));
        assert_eq!(Value::Number(1925.into()), json!(1925));
        assert_ne!(Value::Number(1.into()), json!("1"));
        assert_eq!(
            Value::Sequence(vec![Value::Number(1.into()), Value::Null]),
            json!([1, null])
        );
    }

    #[test]
    fn scalars_serialize_as_json() {
        let value = Value::Sequence(vec![Value::Bool(true), Value::String("x".into())]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[true,"x"]"#);
    }
}
