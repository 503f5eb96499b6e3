//! Significance map configuration loaded from TOML.
//!
//! Every field is optional in the file; missing fields fall back to
//! [`SignificanceConfig::default`]. `config/default.toml` documents the same
//! values for operators and is checked against them in tests.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cluster::AssignmentStrategy;

/// Logical beginning of the dataset.
pub const DEFAULT_EPOCH_START: NaiveDate = match NaiveDate::from_ymd_opt(2024, 9, 1) {
    Some(date) => date,
    None => panic!("invalid default epoch"),
};

/// Default clustering radius.
pub const DEFAULT_RADIUS_KM: f64 = 200.0;

/// Default circle radius per unit of mean magnitude.
pub const DEFAULT_RADIUS_SCALE: f64 = 3.0;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("TOML parse error: {message}")]
    Toml {
        /// Parser message.
        message: String,
    },

    /// The values parsed but are unusable.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },
}

/// Tunables for the weekly significance map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Date whose midnight UTC starts week 0.
    pub epoch_start: NaiveDate,
    /// Cluster radius in kilometers.
    pub radius_km: f64,
    /// How an event picks among clusters in range.
    pub strategy: AssignmentStrategy,
    /// Rendered circle radius per unit of mean magnitude.
    pub radius_scale: f64,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            epoch_start: DEFAULT_EPOCH_START,
            radius_km: DEFAULT_RADIUS_KM,
            strategy: AssignmentStrategy::default(),
            radius_scale: DEFAULT_RADIUS_SCALE,
        }
    }
}

impl SignificanceConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document does not parse, or
    /// [`ConfigError::Invalid`] if [`Self::validate`] fails.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Toml {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Loaded significance config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Checks that the radius and scale are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("radius_km", self.radius_km),
            ("radius_scale", self.radius_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

    #[test]
    fn embedded_default_matches_default_impl() {
        let parsed = SignificanceConfig::from_toml_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, SignificanceConfig::default());
    }

    #[test]
    fn defaults_are_the_published_constants() {
        let config = SignificanceConfig::default();
        assert_eq!(config.epoch_start.to_string(), "2024-09-01");
        assert!((config.radius_km - 200.0).abs() < f64::EPSILON);
        assert_eq!(config.strategy, AssignmentStrategy::FirstWithinRadius);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = SignificanceConfig::from_toml_str("radius_km = 50.0\n").unwrap();
        assert!((config.radius_km - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.epoch_start, DEFAULT_EPOCH_START);

        let empty = SignificanceConfig::from_toml_str("").unwrap();
        assert_eq!(empty, SignificanceConfig::default());
    }

    #[test]
    fn parses_strategy_and_epoch() {
        let config = SignificanceConfig::from_toml_str(
            "epoch_start = \"2025-01-06\"\nstrategy = \"nearest_within_radius\"\n",
        )
        .unwrap();
        assert_eq!(config.epoch_start.to_string(), "2025-01-06");
        assert_eq!(config.strategy, AssignmentStrategy::NearestWithinRadius);
    }

    #[test]
    fn rejects_negative_radius() {
        let err = SignificanceConfig::from_toml_str("radius_km = -5.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "got {err}");
        assert!(err.to_string().contains("radius_km"));
    }

    #[test]
    fn rejects_unknown_strategy() {
        let err = SignificanceConfig::from_toml_str("strategy = \"k_means\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SignificanceConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
