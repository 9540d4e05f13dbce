//! The bounded tree: construction, mutation and reads

use crate::error::{Result, TreeError};
use crate::key::Key;
use crate::limits::Limits;
use crate::mapping::MappingLike;
use crate::meter::{JsonSizeMeter, SizeMeter};
use crate::value::{Value, NULL};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::ops::Index;
use std::sync::Arc;
use tracing::{debug, trace};

/// Whether a caller intends to read or write an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessIntent {
    /// Read an existing attribute
    Read,
    /// Assign an attribute
    Write,
}

/// A recursive, bounded wrapper around a nested key/value document
///
/// Nested mappings become child `DottedTree` nodes one level deeper, arrays
/// become [`Value::Sequence`]s whose mapping elements are wrapped, and scalars
/// are stored unchanged. Every mutation goes through [`DottedTree::assign`],
/// which enforces the depth, attribute count and size limits.
///
/// # Example
///
/// ```
/// use dotted_tree::{DottedTree, Limits};
/// use serde_json::json;
///
/// let doc = DottedTree::wrap(
///     json!({"title": "Test", "author": {"name": "Kafka"}}),
///     Limits::default(),
/// )?;
/// assert_eq!(doc.get_path("author.name").and_then(|v| v.as_str()), Some("Kafka"));
/// # Ok::<(), dotted_tree::TreeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DottedTree {
    depth: usize,
    attributes: IndexMap<Key, Value>,
    limits: Arc<Limits>,
}

impl DottedTree {
    /// Create an empty root node
    pub fn new(limits: impl Into<Arc<Limits>>) -> Result<Self> {
        Self::wrap(Map::new(), limits)
    }

    /// Wrap a mapping as a root node
    ///
    /// Limits are validated against [`Limits::hard_maximums`] first, then
    /// enforced incrementally while each pair is assigned. An error aborts
    /// construction at the offending key.
    pub fn wrap(source: impl MappingLike, limits: impl Into<Arc<Limits>>) -> Result<Self> {
        let limits = limits.into();
        limits.validate()?;
        Self::wrap_at(source, 0, limits)
    }

    /// Parse JSON text and wrap the resulting object as a root node
    ///
    /// Text whose objects nest deeper than the maximum depth fails with
    /// [`TreeError::DepthExceeded`], even when the parser gives up on it first.
    /// Deeply nested arrays that hit the parser's recursion limit still fail
    /// with [`TreeError::Json`].
    pub fn from_json_str(text: &str, limits: impl Into<Arc<Limits>>) -> Result<Self> {
        let limits = limits.into();
        limits.validate()?;

        match serde_json::from_str::<JsonValue>(text) {
            Ok(document) => Self::wrap_at(document, 0, limits),
            Err(err) => {
                let depth = object_nesting(text).saturating_sub(1);
                if depth > limits.max_depth {
                    debug!(depth, max_depth = limits.max_depth, "rejecting text: depth exceeded");
                    return Err(TreeError::DepthExceeded {
                        depth,
                        max_depth: limits.max_depth,
                    });
                }
                Err(err.into())
            }
        }
    }

    fn wrap_at(source: impl MappingLike, depth: usize, limits: Arc<Limits>) -> Result<Self> {
        let pairs = source.into_pairs()?;

        if depth > limits.max_depth {
            debug!(depth, max_depth = limits.max_depth, "rejecting node: depth exceeded");
            return Err(TreeError::DepthExceeded {
                depth,
                max_depth: limits.max_depth,
            });
        }

        let mut node = Self {
            depth,
            attributes: IndexMap::with_capacity(pairs.len()),
            limits,
        };
        for (key, value) in pairs {
            node.assign(key, value)?;
        }
        Ok(node)
    }

    /// Assign `value` under `key` on this node
    ///
    /// This is the single mutation primitive. It rejects the assignment if it
    /// would add an attribute beyond the limit resolved for this node's depth,
    /// or if the serialized size of this node plus the serialized size of
    /// `value` exceeds the maximum size. The size check sums two independently
    /// measured fragments; it is an approximation, not the size of the merged
    /// document.
    ///
    /// Mappings are wrapped one level deeper; mapping elements of arrays are
    /// wrapped likewise. Returns the stored value.
    pub fn assign(&mut self, key: impl Into<Key>, value: impl Into<JsonValue>) -> Result<&Value> {
        let key = key.into();
        let value = value.into();

        self.check_attribute_limit(&key)?;
        self.check_size_limit(&key, &value)?;

        let stored = self.wrap_value(value)?;
        let (index, _) = self.attributes.insert_full(key, stored);
        Ok(&self.attributes[index])
    }

    fn check_attribute_limit(&self, key: &Key) -> Result<()> {
        let Some(limit) = self.limits.max_attrs.resolve(self.depth) else {
            return Ok(());
        };

        let count = self.attributes.len() + usize::from(!self.attributes.contains_key(key));
        if count > limit {
            debug!(key = %key, depth = self.depth, count, limit, "rejecting assignment: too many attributes");
            return Err(TreeError::AttributeLimitExceeded {
                key: key.to_string(),
                depth: self.depth,
                count,
                limit,
            });
        }
        Ok(())
    }

    fn check_size_limit(&self, key: &Key, value: &JsonValue) -> Result<()> {
        let meter = JsonSizeMeter;
        let size = meter
            .serialized_len(self)
            .saturating_add(meter.serialized_len(value));

        if size > self.limits.max_size {
            debug!(key = %key, size, max_size = self.limits.max_size, "rejecting assignment: document too large");
            return Err(TreeError::SizeLimitExceeded {
                key: key.to_string(),
                size,
                max_size: self.limits.max_size,
            });
        }
        Ok(())
    }

    /// Classify a source value for storage on this node
    ///
    /// Nested arrays keep their shape; mappings inside them are wrapped at
    /// the same child depth as direct elements.
    fn wrap_value(&self, value: JsonValue) -> Result<Value> {
        Ok(match value {
            JsonValue::Object(map) => {
                Value::Node(Self::wrap_at(map, self.depth + 1, Arc::clone(&self.limits))?)
            }
            JsonValue::Array(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| self.wrap_value(item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n),
            JsonValue::String(s) => Value::String(s),
        })
    }

    /// Assign every pair of `other` on this node, at this node's depth
    ///
    /// Returns `self` for chaining.
    pub fn merge(&mut self, other: impl MappingLike) -> Result<&mut Self> {
        for (key, value) in other.into_pairs()? {
            self.assign(key, value)?;
        }
        Ok(self)
    }

    /// Assign a value at a dotted path, creating intermediate nodes
    ///
    /// `"authors.creator.name"` assigns `name` on the node under
    /// `authors.creator`, creating `authors` and `creator` when they are
    /// missing, `null` or `false`. Every created node counts against the
    /// limits like any other assignment. A blank path is a no-op returning
    /// `Ok(None)`; trailing empty segments are ignored.
    ///
    /// The nested assignment only sees the node it writes into, so the whole
    /// tree is measured afterwards as well. If it ends up above the maximum
    /// size, or any step fails, the top-level entry under the first segment
    /// is restored and the error returned.
    pub fn recursive_assign(
        &mut self,
        path: &str,
        value: impl Into<JsonValue>,
    ) -> Result<Option<&Value>> {
        if path.trim().is_empty() {
            return Ok(None);
        }

        let mut segments: Vec<&str> = path.split('.').collect();
        while segments.last() == Some(&"") {
            segments.pop();
        }
        let Some((head, rest)) = segments.split_first() else {
            return Ok(None);
        };

        let previous = self.attributes.get(*head).cloned();
        let assigned = self.assign_segments(path, head, rest, value.into()).map(|_| ());
        let outcome = assigned.and_then(|()| self.check_tree_size(path));
        if let Err(err) = outcome {
            match previous {
                Some(value) => {
                    self.attributes.insert(Key::from(*head), value);
                }
                None => {
                    self.attributes.shift_remove(*head);
                }
            }
            return Err(err);
        }

        let mut current = self.get(head);
        for segment in rest {
            current = current.and_then(Value::as_node).and_then(|node| node.get(segment));
        }
        Ok(current)
    }

    fn check_tree_size(&self, path: &str) -> Result<()> {
        let size = JsonSizeMeter.serialized_len(self);
        if size > self.limits.max_size {
            debug!(path, size, max_size = self.limits.max_size, "rejecting dotted assignment: document too large");
            return Err(TreeError::SizeLimitExceeded {
                key: path.to_string(),
                size,
                max_size: self.limits.max_size,
            });
        }
        Ok(())
    }

    fn assign_segments(
        &mut self,
        path: &str,
        head: &str,
        rest: &[&str],
        value: JsonValue,
    ) -> Result<&Value> {
        let Some((next, rest)) = rest.split_first() else {
            return self.assign(head, value);
        };

        if !self.attributes.get(head).is_some_and(Value::is_truthy) {
            trace!(segment = head, depth = self.depth + 1, "creating intermediate node");
            self.assign(head, JsonValue::Object(Map::new()))?;
        }

        match self.attributes.get_mut(head) {
            Some(Value::Node(child)) => child.assign_segments(path, next, rest, value),
            _ => Err(TreeError::PathConflict {
                path: path.to_string(),
                segment: head.to_string(),
            }),
        }
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Follow a dotted path through nested nodes
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_node()?.get(segment)?;
        }
        Some(current)
    }

    /// Returns true if `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Write intent is always answered; read intent only for present keys
    pub fn responds_to(&self, name: &str, intent: AccessIntent) -> bool {
        match intent {
            AccessIntent::Write => true,
            AccessIntent::Read => self.contains_key(name),
        }
    }

    /// Number of attributes on this node
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if this node has no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attribute keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.attributes.keys()
    }

    /// Attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.attributes.iter()
    }

    /// Distance from the root, which is 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Limits this tree was built with
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Deepest node depth in this subtree
    pub fn max_depth_reached(&self) -> usize {
        fn deepest(value: &Value, fallback: usize) -> usize {
            match value {
                Value::Node(node) => node.max_depth_reached(),
                Value::Sequence(items) => items
                    .iter()
                    .map(|item| deepest(item, fallback))
                    .max()
                    .unwrap_or(fallback),
                _ => fallback,
            }
        }

        self.attributes
            .values()
            .map(|value| deepest(value, self.depth))
            .max()
            .unwrap_or(self.depth)
    }

    /// Recursively convert into a plain JSON mapping
    ///
    /// The result contains no tree types and keeps insertion order.
    pub fn to_plain(&self) -> Map<String, JsonValue> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_plain()))
            .collect()
    }

    /// Recursively convert into a plain JSON object value
    pub fn to_json_value(&self) -> JsonValue {
        JsonValue::Object(self.to_plain())
    }
}

/// Deepest count of simultaneously open objects in JSON text
fn object_nesting(text: &str) -> usize {
    let (mut open, mut deepest) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => {
                open += 1;
                deepest = deepest.max(open);
            }
            b'}' => open = open.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

impl Default for DottedTree {
    fn default() -> Self {
        Self {
            depth: 0,
            attributes: IndexMap::new(),
            limits: Arc::new(Limits::default()),
        }
    }
}

impl PartialEq for DottedTree {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth && self.attributes == other.attributes
    }
}

impl PartialEq<Map<String, JsonValue>> for DottedTree {
    fn eq(&self, other: &Map<String, JsonValue>) -> bool {
        self.attributes.len() == other.len()
            && self
                .attributes
                .iter()
                .all(|(key, value)| other.get(key.as_str()).is_some_and(|v| value == v))
    }
}

impl Index<&str> for DottedTree {
    type Output = Value;

    /// Missing keys read as `Null`
    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl From<&DottedTree> for JsonValue {
    fn from(tree: &DottedTree) -> Self {
        tree.to_json_value()
    }
}
