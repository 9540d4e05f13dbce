//! Security limits and configuration

use crate::error::{Result, TreeError};
use std::collections::BTreeMap;

/// Default maximum depth of the tree, counted from 0 at the root
pub const DEFAULT_MAX_DEPTH: usize = 10;
/// Default maximum attribute count per node
pub const DEFAULT_MAX_ATTRS: usize = 10;
/// Default maximum serialized size in bytes
pub const DEFAULT_MAX_SIZE: usize = 16_384;

/// Per-node attribute count limit
///
/// Either one limit for every depth, or a table keyed by depth with an
/// optional fallback. A depth with neither an entry nor a fallback is
/// unlimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrLimit {
    /// Same limit at every depth
    Uniform(usize),
    /// Limit looked up by node depth
    PerDepth {
        /// Explicit limits by depth
        depths: BTreeMap<usize, usize>,
        /// Limit for depths missing from `depths`
        default: Option<usize>,
    },
}

impl AttrLimit {
    /// Build a per-depth table from `(depth, limit)` pairs
    pub fn per_depth<I>(entries: I, default: Option<usize>) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        AttrLimit::PerDepth {
            depths: entries.into_iter().collect(),
            default,
        }
    }

    /// No attribute limit at any depth
    pub fn unlimited() -> Self {
        AttrLimit::PerDepth {
            depths: BTreeMap::new(),
            default: None,
        }
    }

    /// Resolve the limit that applies to a node at `depth`
    pub fn resolve(&self, depth: usize) -> Option<usize> {
        match self {
            AttrLimit::Uniform(limit) => Some(*limit),
            AttrLimit::PerDepth { depths, default } => depths.get(&depth).copied().or(*default),
        }
    }
}

impl Default for AttrLimit {
    fn default() -> Self {
        AttrLimit::Uniform(DEFAULT_MAX_ATTRS)
    }
}

impl From<usize> for AttrLimit {
    fn from(limit: usize) -> Self {
        AttrLimit::Uniform(limit)
    }
}

/// Security limits to prevent pathological or adversarial documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum node depth, root is 0 (default: 10, hard: 128)
    pub max_depth: usize,
    /// Maximum attributes per node (default: 10 at every depth)
    pub max_attrs: AttrLimit,
    /// Maximum approximate serialized size in bytes (default: 16 KiB, hard: 64 MiB)
    pub max_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_attrs: AttrLimit::default(),
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl Limits {
    /// Hard maximum limits that cannot be exceeded
    ///
    /// Attribute counts have no hard maximum; the size limit bounds them.
    pub fn hard_maximums() -> Self {
        Self {
            max_depth: 128,
            max_attrs: AttrLimit::unlimited(),
            max_size: 64 * 1024 * 1024,
        }
    }

    /// Validate limits against hard maximums
    pub fn validate(&self) -> Result<()> {
        let hard = Self::hard_maximums();

        if self.max_depth > hard.max_depth {
            return Err(TreeError::ConfigurationExceedsHardLimits {
                reason: format!(
                    "max_depth {} exceeds hard limit {}",
                    self.max_depth, hard.max_depth
                ),
            });
        }

        if self.max_size > hard.max_size {
            return Err(TreeError::ConfigurationExceedsHardLimits {
                reason: format!(
                    "max_size {} exceeds hard limit {}",
                    self.max_size, hard.max_size
                ),
            });
        }

        Ok(())
    }

    /// Replace the maximum depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the attribute limit
    pub fn with_max_attrs(mut self, max_attrs: impl Into<AttrLimit>) -> Self {
        self.max_attrs = max_attrs.into();
        self
    }

    /// Replace the maximum serialized size
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_within_hard_max() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, 10);
        assert_eq!(limits.max_size, 16_384);
        assert_eq!(limits.max_attrs, AttrLimit::Uniform(10));
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn validate_rejects_excessive_depth() {
        let limits = Limits::default().with_max_depth(500);
        assert!(matches!(
            limits.validate(),
            Err(TreeError::ConfigurationExceedsHardLimits { .. })
        ));
    }

    #[test]
    fn validate_rejects_excessive_size() {
        let limits = Limits::default().with_max_size(128 * 1024 * 1024);
        assert!(limits.validate().is_err());
    }

    #[test]
    fn uniform_limit_applies_everywhere() {
        let limit = AttrLimit::Uniform(3);
        assert_eq!(limit.resolve(0), Some(3));
        assert_eq!(limit.resolve(9), Some(3));
    }

    #[test]
    fn per_depth_limit_falls_back_to_default() {
        let limit = AttrLimit::per_depth([(1, 3)], Some(2));
        assert_eq!(limit.resolve(0), Some(2));
        assert_eq!(limit.resolve(1), Some(3));
        assert_eq!(limit.resolve(7), Some(2));
    }

    #[test]
    fn per_depth_limit_without_default_is_unlimited() {
        let limit = AttrLimit::per_depth([(1, 20), (2, 5)], None);
        assert_eq!(limit.resolve(2), Some(5));
        assert_eq!(limit.resolve(0), None);
        assert_eq!(AttrLimit::unlimited().resolve(3), None);
    }
}
