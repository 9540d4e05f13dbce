//! Dotted Tree - bounded, navigable wrapper for nested JSON documents
//!
//! This crate turns a nested key/value document into a tree of nodes that can
//! be read attribute by attribute, mutated through dotted paths, and flattened
//! back into plain JSON. It includes:
//!
//! - The bounded tree and its single mutation primitive
//! - Security limits (depth, attributes per node, serialized size)
//! - Canonical attribute keys
//! - Mapping-like input conversion
//! - Serialized size metering
//! - Field projection for serialization
//! - Identity and naming adapters
//! - Error types

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod identity;
pub mod key;
pub mod limits;
pub mod mapping;
pub mod meter;
pub mod serialize;
pub mod tree;
pub mod value;

// Re-export commonly used types
pub use error::{Result, TreeError};
pub use identity::{IdentityAdapter, TypeDescriptor, TypeRegistry};
pub use key::Key;
pub use limits::{AttrLimit, Limits};
pub use mapping::MappingLike;
pub use meter::{JsonSizeMeter, SizeMeter};
pub use serialize::SerializeOptions;
pub use tree::{AccessIntent, DottedTree};
pub use value::Value;
