//! JSON output reporter
//!
//! Statements are written as an array of strings; executor calls as an array
//! of objects tagged by `call`.

use crate::output::{JsonReporter, Report, ReportError, Reporter};
use std::io::Write;

impl Reporter for JsonReporter {
    fn emit(&self, report: &Report, out: &mut dyn Write) -> Result<(), ReportError> {
        let json = match report {
            Report::Statements(statements) => serde_json::to_string_pretty(statements),
            Report::Calls(calls) => serde_json::to_string_pretty(calls),
        }
        .map_err(|e| ReportError::Serialization(e.to_string()))?;

        out.write_all(json.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}
