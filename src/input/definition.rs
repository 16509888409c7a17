//! Action definition files
//!
//! A definition file lists the actions of one migration as data, so a plan
//! can be built and inspected without writing a migration body in Rust.
//!
//! ```toml
//! [[actions]]
//! action = "add_column"
//! table = { name = "users" }
//! column = { name = "email", type = "string", null = true }
//!
//! [[actions]]
//! action = "drop_index"
//! table = { name = "users" }
//! target = { columns = ["legacy_email"] }
//! ```
//!
//! The same structure is accepted as JSON.

use crate::input::LoadError;
use crate::plan::{Action, Intent};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MigrationDefinition {
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl MigrationDefinition {
    /// Read and validate a `.toml` or `.json` definition file.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        let parse: fn(&str) -> Result<Self, String> = match extension.as_deref() {
            Some("toml") => parse_toml,
            Some("json") => parse_json,
            _ => {
                return Err(LoadError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        let contents = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let definition = parse(&contents).map_err(|message| LoadError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        for (index, action) in definition.actions.iter().enumerate() {
            action.validate().map_err(|source| LoadError::Invalid {
                path: path.to_path_buf(),
                index: index + 1,
                source,
            })?;
        }

        tracing::debug!(
            path = %path.display(),
            actions = definition.actions.len(),
            "loaded migration definition"
        );
        Ok(definition)
    }

    /// The actions as an intent, in file order.
    pub fn into_intent(self) -> Intent {
        Intent::from(self.actions)
    }
}

fn parse_toml(contents: &str) -> Result<MigrationDefinition, String> {
    toml::from_str(contents).map_err(|e| e.to_string())
}

fn parse_json(contents: &str) -> Result<MigrationDefinition, String> {
    serde_json::from_str(contents).map_err(|e| e.to_string())
}
