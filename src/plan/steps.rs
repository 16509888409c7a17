//! Per-table groupings produced by the planner

use super::Action;
use crate::schema::{Column, Index, Table};

/// Everything needed to create one table in a single operation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTable {
    table: Table,
    columns: Vec<Column>,
    indexes: Vec<Index>,
}

impl NewTable {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }
}

/// An ordered list of actions to run against one existing table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    table: Table,
    actions: Vec<Action>,
}

impl AlterTable {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            actions: Vec::new(),
        }
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}
