//! Output reporters for different formats
//!
//! Supports human-readable text and pretty-printed JSON.

use crate::executor::ExecutorCall;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Statements split out of SQL scripts, in script order.
    Statements(Vec<String>),
    /// Calls a plan made against an executor, in call order.
    Calls(Vec<ExecutorCall>),
}

/// Trait for output format reporters.
pub trait Reporter {
    /// Write the report to `out`.
    fn emit(&self, report: &Report, out: &mut dyn Write) -> Result<(), ReportError>;
}

pub struct TextReporter;

impl TextReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up the reporter for a format name accepted by the config.
pub fn reporter_for(format: &str) -> Option<Box<dyn Reporter>> {
    match format {
        "text" => Some(Box::new(TextReporter::new())),
        "json" => Some(Box::new(JsonReporter::new())),
        _ => None,
    }
}

pub mod json;
pub mod text;
