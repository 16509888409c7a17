//! Configuration file parsing
//!
//! Reads migration-planner.toml configuration files.

use crate::schema::ColumnDefaults;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Defaults for columns built through `MigrationTable`
    #[serde(default)]
    pub columns: ColumnDefaults,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Drop comment text from split statements
    #[serde(default)]
    pub strip_comments: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

/// Formats accepted by `[output] format` and `--format`.
pub const OUTPUT_FORMATS: &[&str] = &["text", "json"];

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let format = &self.output.format;
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid output format '{}'. Valid values: {}",
                format,
                OUTPUT_FORMATS.join(", ")
            )));
        }
        Ok(())
    }
}
