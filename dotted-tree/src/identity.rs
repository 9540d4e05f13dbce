//! Identity, naming and type masquerade
//!
//! A tree can report itself as logically belonging to a named external type,
//! based on its `_type` (or `type`) discriminator. Resolution is delegated to
//! an [`IdentityAdapter`] supplied by the caller. It only affects naming and
//! inspection; data, limits and serialization never consult it.

use crate::tree::DottedTree;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt::{self, Write};

/// Name of the tree's own type
const OWN_TYPE: &str = "DottedTree";

/// Naming forms of a logical type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name, e.g. `FakeRailsModel`
    pub name: String,
    /// Singular form, e.g. `fake_rails_model`
    pub singular: String,
    /// Plural form, e.g. `fake_rails_models`
    pub plural: String,
}

impl TypeDescriptor {
    /// Create a descriptor with explicit forms
    pub fn new(
        name: impl Into<String>,
        singular: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// Derive the forms from an underscored discriminator
    ///
    /// `fake_rails_model` gives `FakeRailsModel`, `fake_rails_model` and
    /// `fake_rails_models`. Pluralization only appends `s`; register explicit
    /// forms with [`TypeDescriptor::new`] for anything irregular.
    pub fn from_discriminator(discriminator: &str) -> Self {
        let singular = discriminator.trim().to_string();
        let name = singular
            .split('_')
            .filter(|part| !part.is_empty())
            .map(capitalize)
            .collect::<String>();
        let plural = format!("{singular}s");
        Self {
            name,
            singular,
            plural,
        }
    }

    fn own() -> Self {
        Self::new(OWN_TYPE, "dotted_tree", "dotted_trees")
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolves a discriminator value to a known external type
pub trait IdentityAdapter {
    /// Return the descriptor for `discriminator`, or `None` if unknown
    fn resolve(&self, discriminator: &str) -> Option<TypeDescriptor>;
}

/// Adapter backed by an explicit set of registered types
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under its singular form
    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(descriptor.singular.clone(), descriptor);
        self
    }

    /// Register a type derived from its discriminator
    pub fn register_discriminator(&mut self, discriminator: &str) -> &mut Self {
        self.register(TypeDescriptor::from_discriminator(discriminator))
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl IdentityAdapter for TypeRegistry {
    fn resolve(&self, discriminator: &str) -> Option<TypeDescriptor> {
        self.types.get(discriminator).cloned()
    }
}

impl DottedTree {
    /// Primary identifier: `id`, else the legacy `_id`
    pub fn id(&self) -> Option<&Value> {
        self.get("id")
            .filter(|v| !v.is_null())
            .or_else(|| self.get("_id").filter(|v| !v.is_null()))
    }

    /// Type discriminator: string `type`, else the legacy `_type`
    pub fn type_name(&self) -> Option<&str> {
        self.get("type")
            .and_then(Value::as_str)
            .or_else(|| self.get("_type").and_then(Value::as_str))
    }

    /// Persisted iff the resolved identifier is truthy
    pub fn is_persisted(&self) -> bool {
        self.id().is_some_and(Value::is_truthy)
    }

    /// `[id]` for persisted documents
    pub fn to_key(&self) -> Option<Vec<&Value>> {
        if self.is_persisted() {
            self.id().map(|id| vec![id])
        } else {
            None
        }
    }

    /// External type this tree masquerades as, if any
    ///
    /// Uses the `_type` discriminator first, then `type`. Returns `None` when
    /// there is no adapter, no discriminator, or the adapter does not know it.
    pub fn logical_type(&self, adapter: Option<&dyn IdentityAdapter>) -> Option<TypeDescriptor> {
        let adapter = adapter?;
        let discriminator = self
            .get("_type")
            .and_then(Value::as_str)
            .or_else(|| self.get("type").and_then(Value::as_str))?;
        adapter.resolve(discriminator)
    }

    /// Naming forms: the logical type's, else the tree's own
    pub fn model_name(&self, adapter: Option<&dyn IdentityAdapter>) -> TypeDescriptor {
        self.logical_type(adapter).unwrap_or_else(TypeDescriptor::own)
    }

    /// Debug rendering, e.g. `<DottedTree (FakeRailsModel) id: 1, title: "Test">`
    pub fn inspect(&self, adapter: Option<&dyn IdentityAdapter>) -> String {
        Inspect { tree: self, adapter }.to_string()
    }

    fn write_inspect(
        &self,
        out: &mut impl Write,
        adapter: Option<&dyn IdentityAdapter>,
    ) -> fmt::Result {
        write!(out, "<{OWN_TYPE}")?;
        if let Some(logical) = self.logical_type(adapter) {
            write!(out, " ({})", logical.name)?;
        }
        for (index, (key, value)) in self.iter().enumerate() {
            out.write_str(if index == 0 { " " } else { ", " })?;
            write!(out, "{key}: ")?;
            write_inspect_value(out, value, adapter)?;
        }
        out.write_char('>')
    }
}

fn write_inspect_value(
    out: &mut impl Write,
    value: &Value,
    adapter: Option<&dyn IdentityAdapter>,
) -> fmt::Result {
    match value {
        Value::Node(node) => node.write_inspect(out, adapter),
        Value::Sequence(items) => {
            out.write_char('[')?;
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.write_str(", ")?;
                }
                write_inspect_value(out, item, adapter)?;
            }
            out.write_char(']')
        }
        Value::Null => out.write_str("null"),
        Value::Bool(b) => write!(out, "{b}"),
        Value::Number(n) => write!(out, "{n}"),
        Value::String(s) => write!(out, "{s:?}"),
    }
}

/// Debug rendering of a tree against an optional adapter
struct Inspect<'a> {
    tree: &'a DottedTree,
    adapter: Option<&'a dyn IdentityAdapter>,
}

impl fmt::Display for Inspect<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.write_inspect(f, self.adapter)
    }
}

impl fmt::Display for DottedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_inspect(f, None)
    }
}
