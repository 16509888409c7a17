//! Table-manipulation facade used by migration bodies
//!
//! A [`MigrationTable`] accumulates actions against one table and hands them
//! to the planner when `create`, `update` or `save` is called. Every
//! chaining method validates its action before queueing it, so a bad column
//! or index is reported at the call that introduced it.

use crate::executor::{ExecuteError, Executor, SchemaCatalog};
use crate::plan::{Action, DropTarget, Intent, Plan};
use crate::schema::{
    Column, ColumnDefaults, ColumnType, ForeignKey, Index, SchemaError, Table, TableOptions,
};

#[derive(Debug, Clone)]
pub struct MigrationTable {
    table: Table,
    defaults: ColumnDefaults,
    intent: Intent,
    /// Name the table takes once the queued batch has run.
    pending_rename: Option<Table>,
}

impl MigrationTable {
    pub fn new(
        name: impl Into<String>,
        options: TableOptions,
        defaults: ColumnDefaults,
    ) -> Result<Self, SchemaError> {
        Ok(Self {
            table: Table::with_options(name, options)?,
            defaults,
            intent: Intent::new(),
            pending_rename: None,
        })
    }

    /// Current name of the table. A queued rename takes effect only after
    /// the batch has run.
    pub fn name(&self) -> &str {
        self.table.name()
    }

    /// The name a queued rename will give the table, if any.
    pub fn renamed_to(&self) -> Option<&str> {
        self.pending_rename.as_ref().map(Table::name)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Actions queued since the last `create`/`update`/`reset`.
    pub fn pending_actions(&self) -> &Intent {
        &self.intent
    }

    pub fn reset(&mut self) {
        self.intent.clear();
        self.pending_rename = None;
    }

    fn queue(&mut self, action: Action) -> Result<&mut Self, SchemaError> {
        action.validate()?;
        self.intent.add_action(action);
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Columns
    // -----------------------------------------------------------------------

    /// Add a column built from the configured [`ColumnDefaults`].
    pub fn add_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
    ) -> Result<&mut Self, SchemaError> {
        let column = self.defaults.column(name, column_type);
        self.add_column_def(column)
    }

    /// Add an auto-incrementing identity column.
    pub fn add_identity_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
    ) -> Result<&mut Self, SchemaError> {
        let column = self.defaults.identity_column(name, column_type);
        self.add_column_def(column)
    }

    /// Add a fully specified column as-is.
    pub fn add_column_def(&mut self, column: Column) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::AddColumn { table, column })
    }

    /// Replace the definition of `name`. An unnamed `column` keeps `name`.
    pub fn change_column(&mut self, name: &str, column: Column) -> Result<&mut Self, SchemaError> {
        let action = Action::change_column(self.table.clone(), name, column);
        self.queue(action)
    }

    pub fn remove_column(&mut self, name: &str) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::RemoveColumn {
            table,
            column_name: name.to_string(),
        })
    }

    pub fn rename_column(
        &mut self,
        old_name: &str,
        new_name: &str,
    ) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::RenameColumn {
            table,
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Indexes and foreign keys
    // -----------------------------------------------------------------------

    pub fn add_index(&mut self, index: Index) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::AddIndex { table, index })
    }

    /// Drop the index covering exactly `columns`.
    pub fn remove_index(&mut self, columns: &[&str]) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::DropIndex {
            table,
            target: DropTarget::columns(columns),
        })
    }

    pub fn remove_index_by_name(&mut self, name: &str) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::DropIndex {
            table,
            target: DropTarget::name(name),
        })
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::AddForeignKey { table, foreign_key })
    }

    pub fn drop_foreign_key(&mut self, columns: &[&str]) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::DropForeignKey {
            table,
            target: DropTarget::columns(columns),
        })
    }

    pub fn drop_foreign_key_by_name(&mut self, name: &str) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::DropForeignKey {
            table,
            target: DropTarget::name(name),
        })
    }

    // -----------------------------------------------------------------------
    // Table-level changes
    // -----------------------------------------------------------------------

    /// Queue a rename.
    ///
    /// Renames run in the last phase, so actions queued in the same batch
    /// keep targeting the current name. The facade switches to `new_name`
    /// after the batch has run. A second rename chains from the first.
    pub fn rename(&mut self, new_name: &str) -> Result<&mut Self, SchemaError> {
        let current = self.pending_rename.as_ref().unwrap_or(&self.table).clone();
        let renamed = current.renamed(new_name)?;
        self.queue(Action::RenameTable {
            table: current,
            new_name: new_name.to_string(),
        })?;
        self.pending_rename = Some(renamed);
        Ok(self)
    }

    pub fn drop(&mut self) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::DropTable { table })
    }

    /// `None` removes the primary key.
    pub fn change_primary_key(
        &mut self,
        columns: Option<&[&str]>,
    ) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::ChangePrimaryKey {
            table,
            columns: columns.map(|cs| cs.iter().map(|c| c.to_string()).collect()),
        })
    }

    /// `None` removes the comment.
    pub fn change_comment(&mut self, comment: Option<&str>) -> Result<&mut Self, SchemaError> {
        let table = self.table.clone();
        self.queue(Action::ChangeComment {
            table,
            comment: comment.map(str::to_string),
        })
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// Create the table together with everything queued for it.
    ///
    /// Pending actions are cleared whether or not the executor succeeds.
    pub fn create<E: Executor + ?Sized>(&mut self, executor: &mut E) -> Result<(), ExecuteError> {
        self.intent.prepend(Action::CreateTable {
            table: self.table.clone(),
        });
        self.run(executor)
    }

    /// Apply the queued actions to the existing table.
    ///
    /// Pending actions are cleared whether or not the executor succeeds.
    pub fn update<E: Executor + ?Sized>(&mut self, executor: &mut E) -> Result<(), ExecuteError> {
        self.run(executor)
    }

    /// `update` when the table exists, `create` otherwise.
    pub fn save<E: Executor + SchemaCatalog + ?Sized>(
        &mut self,
        executor: &mut E,
    ) -> Result<(), ExecuteError> {
        if executor.has_table(self.table.name())? {
            self.update(executor)
        } else {
            self.create(executor)
        }
    }

    fn run<E: Executor + ?Sized>(&mut self, executor: &mut E) -> Result<(), ExecuteError> {
        let plan = Plan::new(&self.intent);
        let renamed = self.pending_rename.take();
        self.reset();
        plan.execute(executor)?;
        if let Some(table) = renamed {
            self.table = table;
        }
        Ok(())
    }
}
