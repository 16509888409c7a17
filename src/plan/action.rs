//! Atomic table-change actions
//!
//! An [`Action`] is one declarative schema change. Every variant carries
//! exactly one [`Table`], which the planner uses as its grouping key. The set
//! of variants is closed: the bucketing passes in [`Plan`](super::Plan) match
//! on it exhaustively, so adding a variant forces a decision about which
//! phase it runs in.

use crate::schema::{Column, ForeignKey, Index, SchemaError, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{EnumIter, IntoStaticStr};

/// Selects an index or foreign key to drop: either by the columns it
/// covers or by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropTarget {
    Columns(Vec<String>),
    Name(String),
}

impl DropTarget {
    pub fn columns(columns: &[&str]) -> Self {
        Self::Columns(columns.iter().map(|c| c.to_string()).collect())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// The covered columns, if this target selects by columns.
    pub fn as_columns(&self) -> Option<&[String]> {
        match self {
            Self::Columns(columns) => Some(columns),
            Self::Name(_) => None,
        }
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Columns(columns) => write!(f, "({})", columns.join(", ")),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One atomic schema change against a single table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    CreateTable {
        table: Table,
    },
    DropTable {
        table: Table,
    },
    RenameTable {
        table: Table,
        new_name: String,
    },
    /// `None` removes the primary key.
    ChangePrimaryKey {
        table: Table,
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    /// `None` removes the table comment.
    ChangeComment {
        table: Table,
        #[serde(default)]
        comment: Option<String>,
    },
    AddColumn {
        table: Table,
        column: Column,
    },
    ChangeColumn {
        table: Table,
        column_name: String,
        column: Column,
    },
    RemoveColumn {
        table: Table,
        column_name: String,
    },
    RenameColumn {
        table: Table,
        old_name: String,
        new_name: String,
    },
    AddIndex {
        table: Table,
        index: Index,
    },
    DropIndex {
        table: Table,
        target: DropTarget,
    },
    AddForeignKey {
        table: Table,
        foreign_key: ForeignKey,
    },
    DropForeignKey {
        table: Table,
        target: DropTarget,
    },
}

/// Fieldless mirror of [`Action`], used for logging and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    CreateTable,
    DropTable,
    RenameTable,
    ChangePrimaryKey,
    ChangeComment,
    AddColumn,
    ChangeColumn,
    RemoveColumn,
    RenameColumn,
    AddIndex,
    DropIndex,
    AddForeignKey,
    DropForeignKey,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    /// Build a `ChangeColumn`. A replacement column without a name keeps
    /// the name of the column it replaces.
    pub fn change_column(table: Table, column_name: impl Into<String>, mut column: Column) -> Self {
        let column_name = column_name.into();
        if column.name.is_empty() {
            column.name = column_name.clone();
        }
        Self::ChangeColumn {
            table,
            column_name,
            column,
        }
    }

    /// The table this action targets.
    pub fn table(&self) -> &Table {
        match self {
            Self::CreateTable { table }
            | Self::DropTable { table }
            | Self::RenameTable { table, .. }
            | Self::ChangePrimaryKey { table, .. }
            | Self::ChangeComment { table, .. }
            | Self::AddColumn { table, .. }
            | Self::ChangeColumn { table, .. }
            | Self::RemoveColumn { table, .. }
            | Self::RenameColumn { table, .. }
            | Self::AddIndex { table, .. }
            | Self::DropIndex { table, .. }
            | Self::AddForeignKey { table, .. }
            | Self::DropForeignKey { table, .. } => table,
        }
    }

    /// Shorthand for `self.table().name()`.
    pub fn table_name(&self) -> &str {
        self.table().name()
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::CreateTable { .. } => ActionKind::CreateTable,
            Self::DropTable { .. } => ActionKind::DropTable,
            Self::RenameTable { .. } => ActionKind::RenameTable,
            Self::ChangePrimaryKey { .. } => ActionKind::ChangePrimaryKey,
            Self::ChangeComment { .. } => ActionKind::ChangeComment,
            Self::AddColumn { .. } => ActionKind::AddColumn,
            Self::ChangeColumn { .. } => ActionKind::ChangeColumn,
            Self::RemoveColumn { .. } => ActionKind::RemoveColumn,
            Self::RenameColumn { .. } => ActionKind::RenameColumn,
            Self::AddIndex { .. } => ActionKind::AddIndex,
            Self::DropIndex { .. } => ActionKind::DropIndex,
            Self::AddForeignKey { .. } => ActionKind::AddForeignKey,
            Self::DropForeignKey { .. } => ActionKind::DropForeignKey,
        }
    }

    /// Re-check the construction invariants of every payload. Actions built
    /// through the typed constructors already satisfy them; deserialized
    /// ones may not.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let table = self.table();
        table.validate()?;
        let name = table.name();
        match self {
            Self::CreateTable { .. }
            | Self::DropTable { .. }
            | Self::ChangePrimaryKey { .. }
            | Self::ChangeComment { .. } => Ok(()),
            Self::RenameTable { new_name, .. } => {
                if new_name.trim().is_empty() {
                    Err(SchemaError::EmptyTableName)
                } else {
                    Ok(())
                }
            }
            Self::AddColumn { column, .. } | Self::ChangeColumn { column, .. } => {
                column.validate(name)
            }
            Self::RemoveColumn { column_name, .. } => require_column_name(name, column_name),
            Self::RenameColumn {
                old_name, new_name, ..
            } => {
                require_column_name(name, old_name)?;
                require_column_name(name, new_name)
            }
            Self::AddIndex { index, .. } => index.validate(name),
            Self::DropIndex { target, .. } => match target {
                DropTarget::Columns(columns) if columns.is_empty() => {
                    Err(SchemaError::EmptyIndexColumns {
                        table: name.to_string(),
                    })
                }
                _ => Ok(()),
            },
            Self::AddForeignKey { foreign_key, .. } => foreign_key.validate(name),
            Self::DropForeignKey { target, .. } => match target {
                DropTarget::Columns(columns) if columns.is_empty() => {
                    Err(SchemaError::EmptyForeignKeyColumns {
                        table: name.to_string(),
                    })
                }
                _ => Ok(()),
            },
        }
    }
}

fn require_column_name(table: &str, column: &str) -> Result<(), SchemaError> {
    if column.trim().is_empty() {
        return Err(SchemaError::EmptyColumnName {
            table: table.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        match self {
            Self::CreateTable { .. } | Self::DropTable { .. } => Ok(()),
            Self::RenameTable { new_name, .. } => write!(f, " -> {}", new_name),
            Self::ChangePrimaryKey { columns, .. } => match columns {
                Some(columns) => write!(f, " ({})", columns.join(", ")),
                None => f.write_str(" none"),
            },
            Self::ChangeComment { comment, .. } => match comment {
                Some(comment) => write!(f, " {:?}", comment),
                None => f.write_str(" none"),
            },
            Self::AddColumn { column, .. } => {
                write!(f, " {} {}", column.name, column.column_type)
            }
            Self::ChangeColumn {
                column_name,
                column,
                ..
            } => write!(f, " {} -> {} {}", column_name, column.name, column.column_type),
            Self::RemoveColumn { column_name, .. } => write!(f, " {}", column_name),
            Self::RenameColumn {
                old_name, new_name, ..
            } => write!(f, " {} -> {}", old_name, new_name),
            Self::AddIndex { index, .. } => match &index.name {
                Some(name) => write!(f, " {} ({})", name, index.columns.join(", ")),
                None => write!(f, " ({})", index.columns.join(", ")),
            },
            Self::DropIndex { target, .. } | Self::DropForeignKey { target, .. } => {
                write!(f, " {}", target)
            }
            Self::AddForeignKey { foreign_key, .. } => write!(
                f,
                " ({}) -> {}({})",
                foreign_key.columns.join(", "),
                foreign_key.referenced_table,
                foreign_key.referenced_columns.join(", ")
            ),
        }
    }
}
