//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the corpus engine, loaded from TOML files
//! with environment variable overrides and validation.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables
//! 2. Configuration files
//! 3. Default values
//!
//! ## Usage
//! ```rust,no_run
//! use greek_corpus_engine::config::Config;
//!
//! # fn main() -> greek_corpus_engine::Result<()> {
//! let config = Config::from_file("config.toml")?;
//! println!("Grouping mode: {:?}", config.grouping.mode);
//! # Ok(())
//! # }
//! ```

use crate::errors::{CorpusError, Result};
use crate::GroupMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grouping behavior for classification and the book map
    pub grouping: GroupingConfig,
    /// Analytics settings
    pub analytics: AnalyticsConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Grouping behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Default grouping mode for aggregate views
    pub mode: GroupMode,
    /// Corpus word share below which an author collapses into "Other" in
    /// author-mode book maps (0.0 disables collapsing)
    pub author_share_threshold: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            mode: GroupMode::School,
            author_share_threshold: 0.05,
        }
    }
}

/// Analytics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of lemmas reported by the vocabulary frequency ranking
    pub top_lemmas: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { top_lemmas: 100 }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| CorpusError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| CorpusError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("CORPUS_ENGINE_LOG") {
            self.logging.level = level;
        }
        if let Ok(threshold) = std::env::var("CORPUS_ENGINE_AUTHOR_THRESHOLD") {
            if let Ok(threshold) = threshold.parse() {
                self.grouping.author_share_threshold = threshold;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.grouping.author_share_threshold) {
            return Err(CorpusError::ValidationFailed {
                field: "grouping.author_share_threshold".to_string(),
                reason: "Threshold must be between 0.0 and 1.0".to_string(),
            });
        }

        if self.analytics.top_lemmas == 0 {
            return Err(CorpusError::ValidationFailed {
                field: "analytics.top_lemmas".to_string(),
                reason: "Frequency ranking size must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CorpusError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.grouping.mode, GroupMode::School);
        assert!((config.grouping.author_share_threshold - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.analytics.top_lemmas, 100);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[grouping]\nmode = \"author\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.grouping.mode, GroupMode::Author);
        assert_eq!(config.logging.level, "debug");
        // Unspecified sections keep their defaults
        assert_eq!(config.analytics.top_lemmas, 100);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::from_file("/nonexistent/config.toml").unwrap();
        assert_eq!(config.analytics.top_lemmas, 100);
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = Config::default();
        config.grouping.author_share_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(CorpusError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.grouping.mode, config.grouping.mode);
        assert_eq!(parsed.analytics.top_lemmas, config.analytics.top_lemmas);
    }
}
