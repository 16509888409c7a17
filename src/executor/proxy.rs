//! Recording executor that can replay its record backwards
//!
//! A reversible migration body is run once against a [`ProxyExecutor`].
//! Nothing reaches the database; the proxy keeps every action it is handed.
//! [`ProxyExecutor::inverted_intent`] then turns that record into the actions
//! that undo it, and [`ProxyExecutor::execute_inverted`] plans and runs them
//! against a real executor.

use super::{ExecuteError, Executor};
use crate::plan::{Action, DropTarget, Intent, Plan};
use crate::schema::{Column, Index, Table};

#[derive(Debug, Default)]
pub struct ProxyExecutor {
    commands: Vec<Action>,
}

impl ProxyExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in call order.
    pub fn commands(&self) -> &[Action] {
        &self.commands
    }

    /// The actions that undo the recorded ones, last recorded first.
    ///
    /// Fails on the first action that has no inverse.
    pub fn inverted_intent(&self) -> Result<Intent, ExecuteError> {
        self.commands.iter().rev().map(invert).collect()
    }

    /// Plan the inverted actions and run them in inverse phase order.
    pub fn execute_inverted<E: Executor + ?Sized>(
        &self,
        target: &mut E,
    ) -> Result<(), ExecuteError> {
        let intent = self.inverted_intent()?;
        tracing::debug!(
            recorded = self.commands.len(),
            "replaying {} inverted action(s)",
            intent.len()
        );
        Plan::new(&intent).execute_inverse(target)
    }
}

impl Executor for ProxyExecutor {
    fn create_table(
        &mut self,
        table: &Table,
        _columns: &[Column],
        _indexes: &[Index],
    ) -> Result<(), ExecuteError> {
        self.commands.push(Action::CreateTable {
            table: table.clone(),
        });
        Ok(())
    }

    fn execute_actions(&mut self, _table: &Table, actions: &[Action]) -> Result<(), ExecuteError> {
        self.commands.extend_from_slice(actions);
        Ok(())
    }
}

fn invert(action: &Action) -> Result<Action, ExecuteError> {
    let inverse = match action {
        Action::CreateTable { table } => Action::DropTable {
            table: table.clone(),
        },
        Action::RenameTable { table, new_name } => Action::RenameTable {
            table: table.renamed(new_name.as_str())?,
            new_name: table.name().to_string(),
        },
        Action::AddColumn { table, column } => Action::RemoveColumn {
            table: table.clone(),
            column_name: column.name.clone(),
        },
        Action::RenameColumn {
            table,
            old_name,
            new_name,
        } => Action::RenameColumn {
            table: table.clone(),
            old_name: new_name.clone(),
            new_name: old_name.clone(),
        },
        Action::AddIndex { table, index } => Action::DropIndex {
            table: table.clone(),
            target: match &index.name {
                Some(name) => DropTarget::Name(name.clone()),
                None => DropTarget::Columns(index.columns.clone()),
            },
        },
        Action::AddForeignKey { table, foreign_key } => Action::DropForeignKey {
            table: table.clone(),
            target: match &foreign_key.constraint {
                Some(name) => DropTarget::Name(name.clone()),
                None => DropTarget::Columns(foreign_key.columns.clone()),
            },
        },
        Action::DropTable { .. }
        | Action::ChangePrimaryKey { .. }
        | Action::ChangeComment { .. }
        | Action::ChangeColumn { .. }
        | Action::RemoveColumn { .. }
        | Action::DropIndex { .. }
        | Action::DropForeignKey { .. } => {
            return Err(ExecuteError::Irreversible {
                action: action.kind().as_str(),
            });
        }
    };
    Ok(inverse)
}
