//! Migration planning engine
//!
//! A [`Plan`] takes an [`Intent`] and sorts its actions into five buckets:
//!
//! - **creates**: one [`NewTable`] per `CreateTable`, with the columns and
//!   indexes added to that table in the same batch folded in;
//! - **table updates**: column additions, changes, removals and renames on
//!   existing tables;
//! - **table moves**: drops, renames, primary key and comment changes;
//! - **indexes**: index additions and drops on existing tables;
//! - **constraints**: foreign key additions and drops.
//!
//! Conflict resolution then removes work that no longer makes sense (pending
//! changes to a table that is dropped in the same batch) and splits actions
//! that cannot share one ALTER step.
//!
//! Executing runs all creates, then the phases in the order
//! updates → constraints → indexes → moves. The inverse run walks the phases
//! backwards and finishes with the creates. A plan only reorders; turning an
//! action into its opposite is [`ProxyExecutor`](crate::executor::ProxyExecutor)'s job.

mod action;
mod intent;
mod solver;
mod steps;

#[cfg(test)]
mod tests;

pub use action::{Action, ActionKind, DropTarget};
pub use intent::Intent;
pub use steps::{AlterTable, NewTable};

use crate::executor::{ExecuteError, Executor};
use crate::schema::Table;
use solver::ActionSplitter;

/// The four alteration phases, in forward execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TableUpdates,
    Constraints,
    Indexes,
    TableMoves,
}

impl Phase {
    pub const FORWARD: [Phase; 4] = [
        Phase::TableUpdates,
        Phase::Constraints,
        Phase::Indexes,
        Phase::TableMoves,
    ];

    pub const INVERSE: [Phase; 4] = [
        Phase::TableMoves,
        Phase::Indexes,
        Phase::Constraints,
        Phase::TableUpdates,
    ];
}

/// Bucketed, conflict-resolved, ordered form of an [`Intent`].
///
/// Built once and immutable afterwards; planning again means building a new
/// plan from a new intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    table_creates: Vec<NewTable>,
    table_updates: Vec<AlterTable>,
    table_moves: Vec<AlterTable>,
    indexes: Vec<AlterTable>,
    constraints: Vec<AlterTable>,
}

impl Plan {
    pub fn new(intent: &Intent) -> Self {
        let mut plan = Self::default();
        plan.create_plan(intent.actions());
        tracing::debug!(
            creates = plan.table_creates.len(),
            updates = plan.table_updates.len(),
            moves = plan.table_moves.len(),
            indexes = plan.indexes.len(),
            constraints = plan.constraints.len(),
            "planned {} action(s)",
            intent.len()
        );
        plan
    }

    pub fn table_creates(&self) -> &[NewTable] {
        &self.table_creates
    }

    pub fn table_updates(&self) -> &[AlterTable] {
        &self.table_updates
    }

    pub fn table_moves(&self) -> &[AlterTable] {
        &self.table_moves
    }

    pub fn indexes(&self) -> &[AlterTable] {
        &self.indexes
    }

    pub fn constraints(&self) -> &[AlterTable] {
        &self.constraints
    }

    pub fn phase(&self, phase: Phase) -> &[AlterTable] {
        match phase {
            Phase::TableUpdates => &self.table_updates,
            Phase::Constraints => &self.constraints,
            Phase::Indexes => &self.indexes,
            Phase::TableMoves => &self.table_moves,
        }
    }

    /// True when executing the plan would not call the executor at all.
    pub fn is_empty(&self) -> bool {
        self.table_creates.is_empty() && Phase::FORWARD.iter().all(|p| self.phase(*p).is_empty())
    }

    /// Run the plan: creates first, then each phase in forward order.
    ///
    /// The first executor error aborts the remaining work and is returned
    /// unchanged.
    pub fn execute<E: Executor + ?Sized>(&self, executor: &mut E) -> Result<(), ExecuteError> {
        self.run_creates(executor)?;
        for phase in Phase::FORWARD {
            self.run_phase(phase, executor)?;
        }
        Ok(())
    }

    /// Run the phases in reverse order, then the creates.
    ///
    /// The actions themselves are passed through untouched; callers feed a
    /// plan built from already-inverted actions.
    pub fn execute_inverse<E: Executor + ?Sized>(
        &self,
        executor: &mut E,
    ) -> Result<(), ExecuteError> {
        for phase in Phase::INVERSE {
            self.run_phase(phase, executor)?;
        }
        self.run_creates(executor)
    }

    fn run_creates<E: Executor + ?Sized>(&self, executor: &mut E) -> Result<(), ExecuteError> {
        for new_table in &self.table_creates {
            executor.create_table(new_table.table(), new_table.columns(), new_table.indexes())?;
        }
        Ok(())
    }

    fn run_phase<E: Executor + ?Sized>(
        &self,
        phase: Phase,
        executor: &mut E,
    ) -> Result<(), ExecuteError> {
        for alter in self.phase(phase) {
            tracing::debug!(
                ?phase,
                table = alter.table_name(),
                "executing {} action(s)",
                alter.actions().len()
            );
            executor.execute_actions(alter.table(), alter.actions())?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    fn create_plan(&mut self, actions: &[Action]) {
        self.gather_creates(actions);
        self.gather_updates(actions);
        self.gather_table_moves(actions);
        self.gather_indexes(actions);
        self.gather_constraints(actions);
        self.resolve_conflicts();
    }

    fn is_created(&self, name: &str) -> bool {
        self.table_creates.iter().any(|t| t.table().name() == name)
    }

    fn gather_creates(&mut self, actions: &[Action]) {
        for action in actions {
            if let Action::CreateTable { table } = action {
                let new_table = NewTable::new(table.clone());
                // A repeated create replaces the earlier one but keeps its slot.
                match self
                    .table_creates
                    .iter_mut()
                    .find(|t| t.table().name() == table.name())
                {
                    Some(existing) => {
                        tracing::warn!(table = table.name(), "table is created twice in one batch");
                        *existing = new_table;
                    }
                    None => self.table_creates.push(new_table),
                }
            }
        }

        for action in actions {
            let Some(new_table) = self
                .table_creates
                .iter_mut()
                .find(|t| t.table().name() == action.table_name())
            else {
                continue;
            };
            match action {
                Action::AddColumn { column, .. } => new_table.add_column(column.clone()),
                Action::AddIndex { index, .. } => new_table.add_index(index.clone()),
                _ => {}
            }
        }
    }

    fn gather_updates(&mut self, actions: &[Action]) {
        for action in actions {
            let is_update = match action {
                Action::AddColumn { .. }
                | Action::ChangeColumn { .. }
                | Action::RemoveColumn { .. }
                | Action::RenameColumn { .. } => true,
                Action::CreateTable { .. }
                | Action::DropTable { .. }
                | Action::RenameTable { .. }
                | Action::ChangePrimaryKey { .. }
                | Action::ChangeComment { .. }
                | Action::AddIndex { .. }
                | Action::DropIndex { .. }
                | Action::AddForeignKey { .. }
                | Action::DropForeignKey { .. } => false,
            };
            if !is_update {
                continue;
            }
            if !self.is_created(action.table_name()) {
                append_to(&mut self.table_updates, action);
            } else if !matches!(action, Action::AddColumn { .. }) {
                tracing::warn!(
                    table = action.table_name(),
                    action = action.kind().as_str(),
                    "ignoring column change on a table created in the same batch"
                );
            }
        }
    }

    fn gather_table_moves(&mut self, actions: &[Action]) {
        for action in actions {
            let is_move = match action {
                Action::DropTable { .. }
                | Action::RenameTable { .. }
                | Action::ChangePrimaryKey { .. }
                | Action::ChangeComment { .. } => true,
                Action::CreateTable { .. }
                | Action::AddColumn { .. }
                | Action::ChangeColumn { .. }
                | Action::RemoveColumn { .. }
                | Action::RenameColumn { .. }
                | Action::AddIndex { .. }
                | Action::DropIndex { .. }
                | Action::AddForeignKey { .. }
                | Action::DropForeignKey { .. } => false,
            };
            if is_move {
                append_to(&mut self.table_moves, action);
            }
        }
    }

    fn gather_indexes(&mut self, actions: &[Action]) {
        for action in actions {
            let is_index = match action {
                Action::AddIndex { .. } | Action::DropIndex { .. } => true,
                Action::CreateTable { .. }
                | Action::DropTable { .. }
                | Action::RenameTable { .. }
                | Action::ChangePrimaryKey { .. }
                | Action::ChangeComment { .. }
                | Action::AddColumn { .. }
                | Action::ChangeColumn { .. }
                | Action::RemoveColumn { .. }
                | Action::RenameColumn { .. }
                | Action::AddForeignKey { .. }
                | Action::DropForeignKey { .. } => false,
            };
            // Indexes of new tables are created inline.
            if is_index && !self.is_created(action.table_name()) {
                append_to(&mut self.indexes, action);
            }
        }
    }

    fn gather_constraints(&mut self, actions: &[Action]) {
        for action in actions {
            let is_constraint = match action {
                Action::AddForeignKey { .. } | Action::DropForeignKey { .. } => true,
                Action::CreateTable { .. }
                | Action::DropTable { .. }
                | Action::RenameTable { .. }
                | Action::ChangePrimaryKey { .. }
                | Action::ChangeComment { .. }
                | Action::AddColumn { .. }
                | Action::ChangeColumn { .. }
                | Action::RemoveColumn { .. }
                | Action::RenameColumn { .. }
                | Action::AddIndex { .. }
                | Action::DropIndex { .. } => false,
            };
            if is_constraint {
                append_to(&mut self.constraints, action);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Conflict resolution
    // -----------------------------------------------------------------------

    fn resolve_conflicts(&mut self) {
        let dropped: Vec<Table> = self
            .table_moves
            .iter()
            .flat_map(|alter| alter.actions())
            .filter_map(|action| match action {
                Action::DropTable { table } => Some(table.clone()),
                _ => None,
            })
            .collect();

        for table in &dropped {
            self.table_updates = forget_table(table, &self.table_updates);
            self.constraints = forget_table(table, &self.constraints);
            self.indexes = forget_table(table, &self.indexes);
        }

        // The database drops an index together with the column it covers.
        let removed_columns: Vec<(String, String)> = self
            .table_updates
            .iter()
            .flat_map(|alter| alter.actions())
            .filter_map(|action| match action {
                Action::RemoveColumn { table, column_name } => {
                    Some((table.name().to_string(), column_name.clone()))
                }
                _ => None,
            })
            .collect();
        for (table, column) in &removed_columns {
            let (indexes, forgotten) =
                forget_drop_index(table, std::slice::from_ref(column), &self.indexes);
            if !forgotten.is_empty() {
                tracing::debug!(
                    table = table.as_str(),
                    column = column.as_str(),
                    "index drop covered by column removal"
                );
            }
            self.indexes = indexes;
        }

        let updates = std::mem::take(&mut self.table_updates);
        self.table_updates = ActionSplitter::new(|anchor: &Action, candidate: &Action| {
            matches!(
                (anchor, candidate),
                (Action::RenameColumn { new_name, .. }, Action::ChangeColumn { column_name, .. })
                    if new_name == column_name
            )
        })
        .split_all(updates);

        let constraints = std::mem::take(&mut self.constraints);
        let remapped: Vec<AlterTable> = constraints
            .into_iter()
            .map(|alter| self.remap_constraint_and_index_conflicts(alter))
            .collect();
        self.constraints = ActionSplitter::new(|anchor: &Action, candidate: &Action| {
            match (anchor, candidate) {
                (
                    Action::DropForeignKey {
                        target: DropTarget::Columns(dropped),
                        ..
                    },
                    Action::AddForeignKey { foreign_key, .. },
                ) => *dropped == foreign_key.columns,
                _ => false,
            }
        })
        .split_all(remapped);

        self.indexes.retain(|alter| !alter.is_empty());
    }

    /// Move pending index drops that back a dropped foreign key into the
    /// constraint step, right after the foreign key drop.
    fn remap_constraint_and_index_conflicts(&mut self, alter: AlterTable) -> AlterTable {
        let mut remapped = AlterTable::new(alter.table().clone());
        for action in alter.into_actions() {
            let backing = match &action {
                Action::DropForeignKey {
                    table,
                    target: DropTarget::Columns(columns),
                } => {
                    let (indexes, forgotten) =
                        forget_drop_index(table.name(), columns, &self.indexes);
                    self.indexes = indexes;
                    forgotten
                }
                _ => Vec::new(),
            };
            remapped.add_action(action);
            for drop_index in backing {
                remapped.add_action(drop_index);
            }
        }
        remapped
    }
}

/// Append `action` to the entry for its table, creating the entry on first
/// sight.
fn append_to(bucket: &mut Vec<AlterTable>, action: &Action) {
    match bucket
        .iter_mut()
        .find(|alter| alter.table_name() == action.table_name())
    {
        Some(alter) => alter.add_action(action.clone()),
        None => {
            let mut alter = AlterTable::new(action.table().clone());
            alter.add_action(action.clone());
            bucket.push(alter);
        }
    }
}

/// Every entry of `alters` except those for `table`.
pub fn forget_table(table: &Table, alters: &[AlterTable]) -> Vec<AlterTable> {
    alters
        .iter()
        .filter(|alter| alter.table_name() != table.name())
        .cloned()
        .collect()
}

/// Remove `DropIndex` actions on `table` that target exactly `columns`.
///
/// Returns the remaining entries and the removed actions. Entries left
/// empty are kept; the caller prunes them.
fn forget_drop_index(
    table: &str,
    columns: &[String],
    alters: &[AlterTable],
) -> (Vec<AlterTable>, Vec<Action>) {
    let mut forgotten = Vec::new();
    let remaining = alters
        .iter()
        .map(|alter| {
            if alter.table_name() != table {
                return alter.clone();
            }
            let mut kept = AlterTable::new(alter.table().clone());
            for action in alter.actions() {
                match action {
                    Action::DropIndex {
                        target: DropTarget::Columns(dropped),
                        ..
                    } if dropped.as_slice() == columns => forgotten.push(action.clone()),
                    _ => kept.add_action(action.clone()),
                }
            }
            kept
        })
        .collect();
    (remaining, forgotten)
}
