//! Error types for bounded trees

use thiserror::Error;

/// Errors raised while building or mutating a [`DottedTree`](crate::DottedTree)
///
/// Every variant aborts the operation in progress. The offending key's
/// assignment never completes; a failed dotted assignment also undoes the
/// intermediate nodes it created.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Input cannot produce key/value pairs.
    #[error("Expected a mapping-like value, found {found}")]
    InvalidInput {
        /// Human-readable description of what was supplied instead
        found: String,
    },
    /// A nested mapping would create a node below the maximum depth.
    #[error("Maximal depth reached: depth {depth} exceeds limit {max_depth}")]
    DepthExceeded {
        /// Depth the new node would have had
        depth: usize,
        /// Configured maximum depth
        max_depth: usize,
    },
    /// An assignment would push a node's attribute count above its limit.
    #[error(
        "Maximum number of attributes reached: assigning '{key}' at depth {depth} \
         would make {count} attributes (limit: {limit})"
    )]
    AttributeLimitExceeded {
        /// Key whose assignment was rejected
        key: String,
        /// Depth of the node being assigned into
        depth: usize,
        /// Prospective attribute count
        count: usize,
        /// Resolved limit for this depth
        limit: usize,
    },
    /// An assignment's approximate serialized size would exceed the maximum.
    #[error(
        "Maximal size of document reached: assigning '{key}' would measure {size} bytes \
         (limit: {max_size} bytes)"
    )]
    SizeLimitExceeded {
        /// Key whose assignment was rejected
        key: String,
        /// Prospective size in bytes (saturating)
        size: usize,
        /// Configured maximum size
        max_size: usize,
    },
    /// A dotted path runs through a value that is not a nested mapping.
    #[error("Cannot descend into '{segment}' while assigning '{path}': value is not a mapping")]
    PathConflict {
        /// Full dotted path being assigned
        path: String,
        /// Segment holding the non-mapping value
        segment: String,
    },
    /// Limit configuration is above the hard maximums.
    #[error("Configuration exceeds hard limits: {reason}")]
    ConfigurationExceedsHardLimits {
        /// Which limit was exceeded and by how much
        reason: String,
    },
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TreeError>;
