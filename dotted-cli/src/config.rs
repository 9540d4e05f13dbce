//! Limits configuration loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML file passed with `--config`
//! 3. Command-line flags

use dotted_tree::{AttrLimit, Limits, TreeError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading limits configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config '{path}': {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// Config file is not valid TOML for this schema
    #[error("Invalid config '{path}': {source}")]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },
    /// A key of `[attrs_per_depth]` is neither a depth nor `default`
    #[error("Invalid attrs_per_depth key '{key}': expected a depth number or 'default'")]
    InvalidDepthKey {
        /// Offending key
        key: String,
    },
    /// Both a uniform and a per-depth attribute limit were given
    #[error("max_attrs and [attrs_per_depth] are mutually exclusive")]
    ConflictingAttrLimits,
    /// Resulting limits are above the hard maximums
    #[error(transparent)]
    Limits(#[from] TreeError),
}

/// On-disk configuration
///
/// ```toml
/// max_depth = 10
/// max_size = 16384
///
/// [attrs_per_depth]
/// default = 10
/// "1" = 20
/// "2" = 5
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Maximum node depth
    pub max_depth: Option<usize>,
    /// Maximum approximate serialized size in bytes
    pub max_size: Option<usize>,
    /// Uniform attribute limit
    pub max_attrs: Option<usize>,
    /// Attribute limits by depth, with an optional `default` entry
    pub attrs_per_depth: Option<BTreeMap<String, usize>>,
}

impl RawConfig {
    /// Apply this configuration on top of `base`
    pub fn apply(self, mut base: Limits) -> Result<Limits, ConfigError> {
        if let Some(max_depth) = self.max_depth {
            base.max_depth = max_depth;
        }
        if let Some(max_size) = self.max_size {
            base.max_size = max_size;
        }

        match (self.max_attrs, self.attrs_per_depth) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingAttrLimits),
            (Some(limit), None) => base.max_attrs = AttrLimit::Uniform(limit),
            (None, Some(table)) => base.max_attrs = parse_attr_table(table)?,
            (None, None) => {}
        }

        Ok(base)
    }
}

fn parse_attr_table(table: BTreeMap<String, usize>) -> Result<AttrLimit, ConfigError> {
    let mut depths = BTreeMap::new();
    let mut default = None;

    for (key, limit) in table {
        if key == "default" {
            default = Some(limit);
            continue;
        }
        let depth = key
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidDepthKey { key: key.clone() })?;
        depths.insert(depth, limit);
    }

    Ok(AttrLimit::PerDepth { depths, default })
}

/// Limits given directly on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--max-depth`
    pub max_depth: Option<usize>,
    /// `--max-size`
    pub max_size: Option<usize>,
    /// `--max-attrs`, replaces any configured attribute limit
    pub max_attrs: Option<usize>,
}

impl Overrides {
    fn apply(&self, mut limits: Limits) -> Limits {
        if let Some(max_depth) = self.max_depth {
            limits.max_depth = max_depth;
        }
        if let Some(max_size) = self.max_size {
            limits.max_size = max_size;
        }
        if let Some(max_attrs) = self.max_attrs {
            limits.max_attrs = AttrLimit::Uniform(max_attrs);
        }
        limits
    }
}

/// Parse configuration text
pub fn parse_config(text: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the effective limits from defaults, an optional file and flags
pub fn load_limits(path: Option<&Path>, overrides: &Overrides) -> Result<Limits, ConfigError> {
    let mut limits = Limits::default();

    if let Some(path) = path {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        limits = parse_config(&text, path)?.apply(limits)?;
        tracing::debug!(path = %path.display(), "loaded limits config");
    }

    let limits = overrides.apply(limits);
    limits.validate()?;
    tracing::debug!(?limits, "resolved limits");
    Ok(limits)
}
