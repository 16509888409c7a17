//! Human-readable text output reporter
//!
//! Statements are printed one per block, terminated by `;`:
//! ```text
//! insert into users values (1);
//!
//! update users set n = 2;
//! ```
//!
//! Executor calls are printed one per line:
//! ```text
//! create_table users (columns: id, email; indexes: (email))
//! alter posts: add_column title string, drop_index posts_slug_idx
//! ```

use crate::executor::ExecutorCall;
use crate::output::{Report, ReportError, Reporter, TextReporter};
use crate::schema::Index;
use std::io::Write;

fn format_index(index: &Index) -> String {
    match &index.name {
        Some(name) => name.clone(),
        None => format!("({})", index.columns.join(", ")),
    }
}

/// Format a single executor call as one line, without the newline.
fn format_call(call: &ExecutorCall) -> String {
    match call {
        ExecutorCall::CreateTable {
            table,
            columns,
            indexes,
        } => {
            let columns: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
            let mut line = format!(
                "create_table {} (columns: {}",
                table.name(),
                columns.join(", ")
            );
            if !indexes.is_empty() {
                let indexes: Vec<String> = indexes.iter().map(format_index).collect();
                line.push_str("; indexes: ");
                line.push_str(&indexes.join(", "));
            }
            line.push(')');
            line
        }
        ExecutorCall::ExecuteActions { table, actions } => {
            let actions: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
            format!("alter {}: {}", table.name(), actions.join(", "))
        }
    }
}

fn format_report(report: &Report) -> String {
    match report {
        Report::Statements(statements) => statements
            .iter()
            .map(|s| format!("{};\n", s))
            .collect::<Vec<_>>()
            .join("\n"),
        Report::Calls(calls) => calls.iter().map(|c| format_call(c) + "\n").collect(),
    }
}

impl Reporter for TextReporter {
    fn emit(&self, report: &Report, out: &mut dyn Write) -> Result<(), ReportError> {
        out.write_all(format_report(report).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
