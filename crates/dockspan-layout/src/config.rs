#![forbid(unsafe_code)]

//! Tunable docking parameters.
//!
//! [`DockConfig`] can be loaded from TOML or JSON at startup:
//!
//! ```toml
//! split_percent = 0.25
//! grip_size = 6
//! ```
//!
//! ```
//! use dockspan_layout::DockConfig;
//!
//! let config = DockConfig::from_toml_str("split_percent = 0.25").unwrap();
//! assert_eq!(config.split_percent, 0.25);
//! assert_eq!(config.grip_size, DockConfig::default().grip_size);
//! ```
//!
//! Every field defaults to the engine's built-in value, so
//! `DockConfig::default()` reproduces the stock behavior.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Fraction of the target's extent given to a newly docked pane.
pub const DEFAULT_SPLIT_PERCENT: f32 = 0.2;

/// Width in pixels of the band around a split boundary that counts as a grip.
pub const DEFAULT_GRIP_SIZE: i32 = 4;

/// Tolerance used when checking that sibling sizes sum to one.
pub const NORMALIZED_EPSILON: f32 = 1e-5;

/// Docking engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Share of the split extent given to a newly docked pane, in (0, 1).
    pub split_percent: f32,
    /// Resize grip band width in pixels.
    pub grip_size: i32,
    /// Smallest normalized size a resize may leave on any sibling.
    pub min_normalized_size: f32,
    /// Deepest cell nesting a tree may reach, counting the root as 0.
    /// Docks past it are rejected; loads and saves enforce it.
    pub max_depth: usize,
    /// Longest tab title (in bytes) a layout may save or load.
    pub max_title_len: usize,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            split_percent: DEFAULT_SPLIT_PERCENT,
            grip_size: DEFAULT_GRIP_SIZE,
            min_normalized_size: 0.02,
            max_depth: 64,
            max_title_len: 4096,
        }
    }
}

impl DockConfig {
    /// Load from a TOML string and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.into_validated()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string and validate.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.into_validated()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.split_percent > 0.0 && self.split_percent < 1.0) {
            errors.push(format!(
                "split_percent must be in (0, 1), got {}",
                self.split_percent
            ));
        }
        if self.grip_size < 0 {
            errors.push(format!("grip_size must be >= 0, got {}", self.grip_size));
        }
        if !(self.min_normalized_size >= 0.0 && self.min_normalized_size < 0.5) {
            errors.push(format!(
                "min_normalized_size must be in [0, 0.5), got {}",
                self.min_normalized_size
            ));
        }
        if self.max_depth == 0 {
            errors.push("max_depth must be > 0".into());
        }
        if self.max_title_len == 0 {
            errors.push("max_title_len must be > 0".into());
        }

        errors
    }

    fn into_validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading a [`DockConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
