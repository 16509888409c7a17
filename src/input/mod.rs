//! Loading of migration input from disk
//!
//! Supports plain SQL scripts (split into statements) and action definition
//! files in TOML or JSON.

use crate::schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

pub mod definition;
pub mod sql;

pub use definition::MigrationDefinition;
pub use sql::{SqlLoader, SqlScript};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported definition format for {path}: expected .toml or .json")]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid action #{index} in {path}: {source}")]
    Invalid {
        path: PathBuf,
        index: usize,
        #[source]
        source: SchemaError,
    },
}
