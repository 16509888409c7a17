use super::*;
use crate::executor::{ExecutorCall, RecordingExecutor};
use crate::schema::{Column, ColumnType, ForeignKey, Index};
use proptest::prelude::*;

/// Helper: shorthand for a table reference.
fn t(name: &str) -> Table {
    Table::new(name).unwrap()
}

fn create(table: &str) -> Action {
    Action::CreateTable { table: t(table) }
}

fn add_column(table: &str, column: &str) -> Action {
    Action::AddColumn {
        table: t(table),
        column: Column::new(column, ColumnType::String),
    }
}

fn add_index(table: &str, columns: &[&str]) -> Action {
    Action::AddIndex {
        table: t(table),
        index: Index::new(columns),
    }
}

fn drop_index(table: &str, columns: &[&str]) -> Action {
    Action::DropIndex {
        table: t(table),
        target: DropTarget::columns(columns),
    }
}

fn add_fk(table: &str, columns: &[&str]) -> Action {
    Action::AddForeignKey {
        table: t(table),
        foreign_key: ForeignKey::new(columns, "parents", &["id"]),
    }
}

fn drop_fk(table: &str, columns: &[&str]) -> Action {
    Action::DropForeignKey {
        table: t(table),
        target: DropTarget::columns(columns),
    }
}

fn drop_table(table: &str) -> Action {
    Action::DropTable { table: t(table) }
}

fn rename_column(table: &str, old: &str, new: &str) -> Action {
    Action::RenameColumn {
        table: t(table),
        old_name: old.to_string(),
        new_name: new.to_string(),
    }
}

fn change_column(table: &str, column: &str) -> Action {
    Action::change_column(t(table), column, Column::new("", ColumnType::Text))
}

fn plan_of(actions: Vec<Action>) -> Plan {
    Plan::new(&Intent::from(actions))
}

/// Helper: which tables appear in a phase, in order.
fn tables(alters: &[AlterTable]) -> Vec<&str> {
    alters.iter().map(|a| a.table_name()).collect()
}

/// Helper: reduce recorded calls to `create:<t>` / `alter:<t>` labels.
fn call_labels(calls: &[ExecutorCall]) -> Vec<String> {
    calls
        .iter()
        .map(|call| match call {
            ExecutorCall::CreateTable { table, .. } => format!("create:{}", table.name()),
            ExecutorCall::ExecuteActions { table, .. } => format!("alter:{}", table.name()),
        })
        .collect()
}

/// Helper: one action in every bucket, each on its own table.
fn one_per_phase() -> Plan {
    plan_of(vec![
        drop_table("moved"),
        add_index("indexed", &["a"]),
        add_fk("constrained", &["parent_id"]),
        add_column("updated", "a"),
        create("created"),
    ])
}

// -----------------------------------------------------------------------
// Bucketing
// -----------------------------------------------------------------------

#[test]
fn test_empty_intent_gives_empty_plan() {
    let plan = plan_of(vec![]);
    assert!(plan.is_empty());

    let mut executor = RecordingExecutor::new();
    plan.execute(&mut executor).unwrap();
    assert!(executor.calls().is_empty());
}

#[test]
fn test_actions_land_in_their_buckets() {
    let plan = one_per_phase();
    assert_eq!(plan.table_creates().len(), 1);
    assert_eq!(tables(plan.table_updates()), vec!["updated"]);
    assert_eq!(tables(plan.constraints()), vec!["constrained"]);
    assert_eq!(tables(plan.indexes()), vec!["indexed"]);
    assert_eq!(tables(plan.table_moves()), vec!["moved"]);
}

#[test]
fn test_actions_for_one_table_share_an_entry() {
    let plan = plan_of(vec![
        add_column("users", "a"),
        add_column("posts", "b"),
        add_column("users", "c"),
    ]);
    assert_eq!(tables(plan.table_updates()), vec!["users", "posts"]);
    assert_eq!(
        plan.table_updates()[0].actions(),
        &[add_column("users", "a"), add_column("users", "c")]
    );
}

#[test]
fn test_create_folds_columns_and_indexes() {
    let plan = plan_of(vec![
        create("users"),
        add_column("users", "c1"),
        add_column("users", "c2"),
        add_index("users", &["c1"]),
    ]);

    let new_table = &plan.table_creates()[0];
    assert_eq!(new_table.table().name(), "users");
    let names: Vec<&str> = new_table.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["c1", "c2"]);
    assert_eq!(new_table.indexes(), &[Index::new(&["c1"])]);
    assert!(plan.table_updates().is_empty());
    assert!(plan.indexes().is_empty());
}

#[test]
fn test_create_folds_columns_added_before_the_create() {
    let plan = plan_of(vec![add_column("users", "early"), create("users")]);
    assert_eq!(plan.table_creates()[0].columns().len(), 1);
    assert!(plan.table_updates().is_empty());
}

#[test]
fn test_duplicate_create_keeps_first_position() {
    let plan = plan_of(vec![create("a"), create("b"), create("a")]);
    let names: Vec<&str> = plan
        .table_creates()
        .iter()
        .map(|t| t.table().name())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_moves_and_constraints_apply_to_created_tables() {
    let plan = plan_of(vec![
        create("users"),
        add_fk("users", &["org_id"]),
        Action::ChangeComment {
            table: t("users"),
            comment: Some("people".to_string()),
        },
    ]);
    assert_eq!(tables(plan.constraints()), vec!["users"]);
    assert_eq!(tables(plan.table_moves()), vec!["users"]);
}

// -----------------------------------------------------------------------
// Conflict resolution
// -----------------------------------------------------------------------

#[test]
fn test_drop_table_forgets_pending_work() {
    let plan = plan_of(vec![
        add_column("users", "c1"),
        add_index("users", &["c1"]),
        add_fk("users", &["org_id"]),
        add_column("posts", "title"),
        drop_table("users"),
    ]);

    assert_eq!(tables(plan.table_updates()), vec!["posts"]);
    assert!(plan.indexes().is_empty());
    assert!(plan.constraints().is_empty());
    assert_eq!(plan.table_moves()[0].actions(), &[drop_table("users")]);
}

#[test]
fn test_forget_table_is_pure() {
    let mut users = AlterTable::new(t("users"));
    users.add_action(add_column("users", "a"));
    let mut posts = AlterTable::new(t("posts"));
    posts.add_action(add_column("posts", "b"));
    let alters = vec![users, posts];

    let remaining = forget_table(&t("users"), &alters);

    assert_eq!(tables(&remaining), vec!["posts"]);
    assert_eq!(alters.len(), 2);
}

#[test]
fn test_removed_column_forgets_its_index_drop() {
    let plan = plan_of(vec![
        drop_index("users", &["email"]),
        drop_index("users", &["email", "org_id"]),
        Action::RemoveColumn {
            table: t("users"),
            column_name: "email".to_string(),
        },
    ]);
    assert_eq!(
        plan.indexes()[0].actions(),
        &[drop_index("users", &["email", "org_id"])]
    );
}

#[test]
fn test_removed_column_leaves_no_empty_index_entry() {
    let plan = plan_of(vec![
        drop_index("users", &["email"]),
        Action::RemoveColumn {
            table: t("users"),
            column_name: "email".to_string(),
        },
    ]);
    assert!(plan.indexes().is_empty());
}

#[test]
fn test_rename_then_change_is_split() {
    let plan = plan_of(vec![
        rename_column("users", "mail", "email"),
        change_column("users", "email"),
        add_column("users", "age"),
    ]);

    let updates = plan.table_updates();
    assert_eq!(tables(updates), vec!["users", "users"]);
    assert_eq!(
        updates[0].actions(),
        &[rename_column("users", "mail", "email"), add_column("users", "age")]
    );
    assert_eq!(updates[1].actions(), &[change_column("users", "email")]);
}

#[test]
fn test_foreign_key_drop_pulls_its_index_drop() {
    let plan = plan_of(vec![
        drop_index("posts", &["user_id"]),
        drop_index("posts", &["slug"]),
        drop_fk("posts", &["user_id"]),
    ]);

    assert_eq!(
        plan.constraints()[0].actions(),
        &[drop_fk("posts", &["user_id"]), drop_index("posts", &["user_id"])]
    );
    assert_eq!(plan.indexes()[0].actions(), &[drop_index("posts", &["slug"])]);
}

#[test]
fn test_foreign_key_drop_then_add_is_split() {
    let plan = plan_of(vec![
        drop_fk("posts", &["user_id"]),
        add_fk("posts", &["user_id"]),
        add_fk("posts", &["tag_id"]),
    ]);

    let constraints = plan.constraints();
    assert_eq!(constraints.len(), 2);
    assert_eq!(
        constraints[0].actions(),
        &[drop_fk("posts", &["user_id"]), add_fk("posts", &["tag_id"])]
    );
    assert_eq!(constraints[1].actions(), &[add_fk("posts", &["user_id"])]);
}

#[test]
fn test_named_foreign_key_drop_is_not_split() {
    let plan = plan_of(vec![
        Action::DropForeignKey {
            table: t("posts"),
            target: DropTarget::name("posts_user_fk"),
        },
        add_fk("posts", &["user_id"]),
    ]);
    assert_eq!(plan.constraints().len(), 1);
}

// -----------------------------------------------------------------------
// Execution
// -----------------------------------------------------------------------

#[test]
fn test_execute_phase_order() {
    let mut executor = RecordingExecutor::new();
    one_per_phase().execute(&mut executor).unwrap();

    assert_eq!(
        call_labels(executor.calls()),
        vec![
            "create:created",
            "alter:updated",
            "alter:constrained",
            "alter:indexed",
            "alter:moved",
        ]
    );
}

#[test]
fn test_execute_inverse_phase_order() {
    let mut executor = RecordingExecutor::new();
    one_per_phase().execute_inverse(&mut executor).unwrap();

    assert_eq!(
        call_labels(executor.calls()),
        vec![
            "alter:moved",
            "alter:indexed",
            "alter:constrained",
            "alter:updated",
            "create:created",
        ]
    );
}

#[test]
fn test_execute_passes_folded_create() {
    let plan = plan_of(vec![create("users"), add_column("users", "id")]);
    let mut executor = RecordingExecutor::new();
    plan.execute(&mut executor).unwrap();

    let ExecutorCall::CreateTable { columns, .. } = &executor.calls()[0] else {
        panic!("expected a create_table call");
    };
    assert_eq!(columns.len(), 1);
}

/// Fails on the first `execute_actions` call.
struct FailingExecutor {
    creates: usize,
    alters: usize,
}

impl Executor for FailingExecutor {
    fn create_table(
        &mut self,
        _table: &Table,
        _columns: &[Column],
        _indexes: &[Index],
    ) -> Result<(), ExecuteError> {
        self.creates += 1;
        Ok(())
    }

    fn execute_actions(&mut self, table: &Table, _actions: &[Action]) -> Result<(), ExecuteError> {
        self.alters += 1;
        Err(ExecuteError::Alter {
            table: table.name().to_string(),
            message: "constraint violation".to_string(),
        })
    }
}

#[test]
fn test_execute_stops_at_first_error() {
    let mut executor = FailingExecutor {
        creates: 0,
        alters: 0,
    };
    let err = one_per_phase().execute(&mut executor).unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to alter table `updated`: constraint violation"
    );
    assert_eq!(executor.creates, 1);
    assert_eq!(executor.alters, 1);
}

#[test]
fn test_execute_inverse_stops_before_creates() {
    let mut executor = FailingExecutor {
        creates: 0,
        alters: 0,
    };
    assert!(one_per_phase().execute_inverse(&mut executor).is_err());
    assert_eq!(executor.creates, 0);
}

// -----------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------

const TABLES: [&str; 3] = ["a", "b", "c"];

/// Actions that conflict resolution never removes.
fn surviving_action() -> impl Strategy<Value = Action> {
    let table = prop::sample::select(TABLES.to_vec());
    let column = prop::sample::select(vec!["x", "y", "z"]);
    (table, column, 0..5u8).prop_map(|(table, column, kind)| match kind {
        0 => add_column(table, column),
        1 => add_index(table, &[column]),
        2 => add_fk(table, &[column]),
        3 => Action::ChangeComment {
            table: t(table),
            comment: Some(column.to_string()),
        },
        _ => Action::RenameTable {
            table: t(table),
            new_name: format!("{table}_{column}"),
        },
    })
}

fn bucketed_count(plan: &Plan) -> usize {
    let created: usize = plan
        .table_creates()
        .iter()
        .map(|t| 1 + t.columns().len() + t.indexes().len())
        .sum();
    let altered: usize = Phase::FORWARD
        .iter()
        .flat_map(|phase| plan.phase(*phase))
        .map(|alter| alter.actions().len())
        .sum();
    created + altered
}

proptest! {
    #[test]
    fn prop_every_action_lands_in_one_bucket(
        created in prop::collection::vec(any::<bool>(), TABLES.len()),
        actions in prop::collection::vec(surviving_action(), 0..24),
    ) {
        let mut intent: Intent = TABLES
            .iter()
            .zip(&created)
            .filter(|(_, created)| **created)
            .map(|(table, _)| create(table))
            .collect();
        intent.merge(Intent::from(actions));

        let plan = Plan::new(&intent);
        prop_assert_eq!(bucketed_count(&plan), intent.len());
        prop_assert!(Phase::FORWARD
            .iter()
            .flat_map(|phase| plan.phase(*phase))
            .all(|alter| !alter.is_empty()));
    }
}
