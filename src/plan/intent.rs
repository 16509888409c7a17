//! Ordered collection of pending actions

use super::Action;

/// Every action accumulated for one table-manipulation session, in the order
/// it was requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intent {
    actions: Vec<Action>,
}

impl Intent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action. No validation happens here.
    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Append all of `other`'s actions after this intent's own.
    pub fn merge(&mut self, other: Intent) {
        self.actions.extend(other.actions);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Put an action in front of everything queued so far.
    pub(crate) fn prepend(&mut self, action: Action) {
        self.actions.insert(0, action);
    }

    pub(crate) fn clear(&mut self) {
        self.actions.clear();
    }
}

impl From<Vec<Action>> for Intent {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl FromIterator<Action> for Intent {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Intent {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Table;

    fn drop_table(name: &str) -> Action {
        Action::DropTable {
            table: Table::new(name).unwrap(),
        }
    }

    #[test]
    fn test_add_action_preserves_order() {
        let mut intent = Intent::new();
        assert!(intent.is_empty());
        intent.add_action(drop_table("a"));
        intent.add_action(drop_table("b"));
        let names: Vec<&str> = intent.actions().iter().map(|a| a.table_name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_merge_appends_other_after_self() {
        let mut a = Intent::from(vec![drop_table("a1"), drop_table("a2")]);
        let b = Intent::from(vec![drop_table("b1"), drop_table("b2")]);
        a.merge(b);
        let names: Vec<&str> = a.actions().iter().map(|a| a.table_name()).collect();
        assert_eq!(names, vec!["a1", "a2", "b1", "b2"]);
    }

    #[test]
    fn test_prepend() {
        let mut intent = Intent::from(vec![drop_table("b")]);
        intent.prepend(drop_table("a"));
        assert_eq!(intent.actions()[0].table_name(), "a");
        assert_eq!(intent.len(), 2);
        intent.clear();
        assert!(intent.is_empty());
    }
}
