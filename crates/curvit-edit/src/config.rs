#![forbid(unsafe_code)]

//! Editor configuration.
//!
//! [`EditorConfig`] groups every tunable of the editing engine. With the
//! `config` feature it can be loaded from TOML or JSON:
//!
//! ```toml
//! # curvit.toml
//! palette_seed = 7
//! default_tangent_mode = "Linear"
//!
//! [history]
//! max_depth = 200
//!
//! [hit_test]
//! key_extent = 5.0
//! ```
//!
//! ```rust,ignore
//! let config = EditorConfig::from_toml_file("curvit.toml")?;
//! let config = EditorConfig::from_json_str(json)?;
//! ```
//!
//! Missing fields keep their defaults.

#[cfg(feature = "config")]
use std::path::Path;

use curvit_core::TangentMode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::hit_test::HitTestConfig;
use crate::palette::Palette;
use crate::undo::HistoryConfig;

/// Tunables of a [`CurveEditor`](crate::editor::CurveEditor).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EditorConfig {
    /// Undo history bounds.
    pub history: HistoryConfig,
    /// Hit-test extents and tolerances.
    pub hit_test: HitTestConfig,
    /// Seed of the curve color palette.
    pub palette_seed: u64,
    /// Tangent mode given to newly added keys.
    pub default_tangent_mode: TangentMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            hit_test: HitTestConfig::default(),
            palette_seed: Palette::DEFAULT_SEED,
            default_tangent_mode: TangentMode::Smooth,
        }
    }
}

impl EditorConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be > 0".into());
        }
        errors.extend(self.hit_test.validate());
        if self.default_tangent_mode == TangentMode::Custom {
            errors.push("default_tangent_mode must be an automatic mode, got Custom".into());
        }
        errors
    }

    /// Return `self` if valid, otherwise every validation error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading or validating an [`EditorConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
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
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
