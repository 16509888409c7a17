//! An executor that records every call instead of running it

use super::{ExecuteError, Executor, SchemaCatalog};
use crate::plan::Action;
use crate::schema::{Column, Index, Table};
use serde::Serialize;
use std::collections::HashSet;

/// One call received by an [`Executor`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ExecutorCall {
    CreateTable {
        table: Table,
        columns: Vec<Column>,
        indexes: Vec<Index>,
    },
    ExecuteActions {
        table: Table,
        actions: Vec<Action>,
    },
}

impl ExecutorCall {
    pub fn table_name(&self) -> &str {
        match self {
            Self::CreateTable { table, .. } | Self::ExecuteActions { table, .. } => table.name(),
        }
    }
}

/// Captures calls in order. Also answers [`SchemaCatalog`] queries from a
/// set of table names, updated as recorded creates, renames and drops pass
/// through, so facades that call `save` behave like they would against a
/// live database.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Vec<ExecutorCall>,
    existing: HashSet<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with tables that already exist.
    pub fn with_tables(tables: &[&str]) -> Self {
        Self {
            calls: Vec::new(),
            existing: tables.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn calls(&self) -> &[ExecutorCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<ExecutorCall> {
        self.calls
    }

    fn track(&mut self, actions: &[Action]) {
        for action in actions {
            match action {
                Action::DropTable { table } => {
                    self.existing.remove(table.name());
                }
                Action::RenameTable { table, new_name } => {
                    self.existing.remove(table.name());
                    self.existing.insert(new_name.clone());
                }
                _ => {}
            }
        }
    }
}

impl Executor for RecordingExecutor {
    fn create_table(
        &mut self,
        table: &Table,
        columns: &[Column],
        indexes: &[Index],
    ) -> Result<(), ExecuteError> {
        tracing::debug!(table = table.name(), columns = columns.len(), "create table");
        self.existing.insert(table.name().to_string());
        self.calls.push(ExecutorCall::CreateTable {
            table: table.clone(),
            columns: columns.to_vec(),
            indexes: indexes.to_vec(),
        });
        Ok(())
    }

    fn execute_actions(&mut self, table: &Table, actions: &[Action]) -> Result<(), ExecuteError> {
        tracing::debug!(table = table.name(), actions = actions.len(), "execute actions");
        self.track(actions);
        self.calls.push(ExecutorCall::ExecuteActions {
            table: table.clone(),
            actions: actions.to_vec(),
        });
        Ok(())
    }
}

impl SchemaCatalog for RecordingExecutor {
    fn has_table(&mut self, name: &str) -> Result<bool, ExecuteError> {
        Ok(self.existing.contains(name))
    }
}
