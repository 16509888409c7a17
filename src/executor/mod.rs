//! The executor contract the planner drives
//!
//! A [`Plan`](crate::plan::Plan) never talks to a database. It hands
//! table creations and per-table action lists to an [`Executor`], which a
//! database adapter implements. Two executors ship with the crate:
//! [`RecordingExecutor`] (captures calls, used for dry runs and tests) and
//! [`ProxyExecutor`] (captures actions so they can be inverted for rollback).

use crate::plan::Action;
use crate::schema::{Column, Index, SchemaError, Table};
use thiserror::Error;

pub mod proxy;
pub mod recording;

pub use proxy::ProxyExecutor;
pub use recording::{ExecutorCall, RecordingExecutor};

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("failed to create table `{table}`: {message}")]
    CreateTable { table: String, message: String },

    #[error("failed to alter table `{table}`: {message}")]
    Alter { table: String, message: String },

    #[error("cannot reverse a `{action}` action")]
    Irreversible { action: &'static str },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Anything an adapter raises that does not fit the variants above.
    #[error(transparent)]
    Adapter(#[from] anyhow::Error),
}

/// Runs planned schema changes against a database.
///
/// Failures are returned as-is and abort the rest of the plan; transaction
/// boundaries belong to the implementor.
pub trait Executor {
    /// Create `table` with all of its columns and indexes in one operation.
    fn create_table(
        &mut self,
        table: &Table,
        columns: &[Column],
        indexes: &[Index],
    ) -> Result<(), ExecuteError>;

    /// Apply an ordered list of non-create actions to an existing table.
    fn execute_actions(&mut self, table: &Table, actions: &[Action]) -> Result<(), ExecuteError>;
}

/// Lookup of existing tables, needed to decide between create and update.
pub trait SchemaCatalog {
    fn has_table(&mut self, name: &str) -> Result<bool, ExecuteError>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn create_table(
        &mut self,
        table: &Table,
        columns: &[Column],
        indexes: &[Index],
    ) -> Result<(), ExecuteError> {
        (**self).create_table(table, columns, indexes)
    }

    fn execute_actions(&mut self, table: &Table, actions: &[Action]) -> Result<(), ExecuteError> {
        (**self).execute_actions(table, actions)
    }
}
