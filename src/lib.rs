//! migration-planner: ordering and replay of table-change actions
//!
//! This library turns the schema changes a migration asks for into an
//! ordered plan that a database adapter can run. Actions are collected in an
//! [`Intent`], bucketed and conflict-resolved by a [`Plan`], and handed to an
//! [`Executor`] in a fixed phase order. Reversible migrations are rolled back
//! by recording them through a [`ProxyExecutor`] and replaying the inverted
//! actions. A quote- and comment-aware splitter breaks raw SQL scripts into
//! statements.

pub mod config;
pub mod executor;
pub mod input;
pub mod migration;
pub mod output;
pub mod parser;
pub mod plan;
pub mod schema;
pub mod table;

// Re-export commonly used types
pub use config::Config;
pub use executor::{ExecuteError, Executor, ProxyExecutor, RecordingExecutor, SchemaCatalog};
pub use migration::{Direction, run_change};
pub use parser::parse_statements;
pub use plan::{Action, AlterTable, Intent, NewTable, Plan};
pub use schema::{Column, ColumnDefaults, ColumnType, ForeignKey, Index, SchemaError, Table};
pub use table::MigrationTable;
