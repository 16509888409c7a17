//! Splitting of conflicting actions inside one `AlterTable`
//!
//! Some pairs of actions cannot run inside the same ALTER statement: changing
//! a column that is renamed in the same batch, or re-adding a foreign key
//! that is dropped in the same batch. The planner bundles actions per table
//! first and then uses an [`ActionSplitter`] to move the second action of each
//! such pair into a follow-up `AlterTable` for the same table.

use super::{Action, AlterTable};

pub(crate) struct ActionSplitter<F>
where
    F: Fn(&Action, &Action) -> bool,
{
    /// `conflicts(anchor, candidate)` is true when `candidate` must run in a
    /// separate step after `anchor`.
    conflicts: F,
}

impl<F> ActionSplitter<F>
where
    F: Fn(&Action, &Action) -> bool,
{
    pub(crate) fn new(conflicts: F) -> Self {
        Self { conflicts }
    }

    /// Split one `AlterTable` into a leading step and a follow-up step.
    ///
    /// Relative order is preserved inside both halves. Empty halves are
    /// dropped, so the result holds zero, one or two entries.
    pub(crate) fn split(&self, alter: AlterTable) -> Vec<AlterTable> {
        let mut head = AlterTable::new(alter.table().clone());
        let mut deferred = AlterTable::new(alter.table().clone());
        let actions = alter.into_actions();

        for (idx, action) in actions.iter().enumerate() {
            let conflicting = actions
                .iter()
                .enumerate()
                .any(|(other, anchor)| other != idx && (self.conflicts)(anchor, action));
            if conflicting {
                deferred.add_action(action.clone());
            } else {
                head.add_action(action.clone());
            }
        }

        [head, deferred]
            .into_iter()
            .filter(|alter| !alter.is_empty())
            .collect()
    }

    /// Apply [`split`](Self::split) to every entry of a phase.
    pub(crate) fn split_all(&self, alters: Vec<AlterTable>) -> Vec<AlterTable> {
        alters.into_iter().flat_map(|alter| self.split(alter)).collect()
    }
}
