//! End-to-end tests that invoke the compiled `migration-planner` binary as a subprocess.
//!
//! These tests exercise CLI argument parsing, config loading, report output and
//! exit codes. Every test runs inside its own temp directory so no stray
//! `migration-planner.toml` is picked up.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Locate the compiled binary built by `cargo test`.
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_migration-planner"))
}

/// Run the binary in `dir` with the given arguments, returning the full Output.
fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute migration-planner binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A definition that creates `users`, extends `posts` and drops `legacy`.
const FORWARD_DEFINITION: &str = r#"
[[actions]]
action = "create_table"
table = { name = "users" }

[[actions]]
action = "add_column"
table = { name = "users" }
column = { name = "id", type = "integer" }

[[actions]]
action = "add_column"
table = { name = "users" }
column = { name = "email", type = "string" }

[[actions]]
action = "add_index"
table = { name = "users" }
index = { columns = ["email"], kind = "unique" }

[[actions]]
action = "add_column"
table = { name = "posts" }
column = { name = "user_id", type = "integer" }

[[actions]]
action = "drop_table"
table = { name = "legacy" }
"#;

/// A reversible definition: create `users`, add a column to `posts`.
const REVERSIBLE_DEFINITION: &str = r#"
[[actions]]
action = "create_table"
table = { name = "users" }

[[actions]]
action = "add_column"
table = { name = "posts" }
column = { name = "user_id", type = "integer" }
"#;

// ---------------------------------------------------------------------------
// split
// ---------------------------------------------------------------------------

#[test]
fn test_split_directory_text() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    fs::create_dir(&scripts).unwrap();
    fs::write(scripts.join("002_b.sql"), "update t set x = 2;").unwrap();
    fs::write(
        scripts.join("001_a.sql"),
        "-- seed\ninsert into t values ('a;b');",
    )
    .unwrap();

    let output = run_in(dir.path(), &["split", "scripts"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "-- seed\ninsert into t values ('a;b');\n\nupdate t set x = 2;\n"
    );
}

#[test]
fn test_split_strip_comments_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("seed.sql"),
        "/* header */ insert into t values (1); -- trailing\n",
    )
    .unwrap();

    let output = run_in(
        dir.path(),
        &["split", "seed.sql", "--strip-comments", "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value, serde_json::json!(["insert into t values (1)"]));
}

#[test]
fn test_split_missing_path_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["split", "nope"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to load SQL scripts"));
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

#[test]
fn test_plan_forward() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("001.toml"), FORWARD_DEFINITION).unwrap();

    let output = run_in(dir.path(), &["plan", "001.toml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "create_table users (columns: id, email; indexes: (email))\n\
         alter posts: add_column user_id integer\n\
         alter legacy: drop_table\n"
    );
}

#[test]
fn test_plan_rollback() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("002.toml"), REVERSIBLE_DEFINITION).unwrap();

    let output = run_in(dir.path(), &["plan", "002.toml", "--rollback"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "alter users: drop_table\nalter posts: remove_column user_id\n"
    );
}

#[test]
fn test_plan_rollback_of_irreversible_action_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("001.toml"), FORWARD_DEFINITION).unwrap();

    let output = run_in(dir.path(), &["plan", "001.toml", "--rollback"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("cannot reverse a `drop_table` action"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_plan_invalid_definition_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bad.json"),
        r#"{ "actions": [ { "action": "create_table", "table": { "name": "" } } ] }"#,
    )
    .unwrap();

    let output = run_in(dir.path(), &["plan", "bad.json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("cannot use an empty table name"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn test_default_config_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("migration-planner.toml"),
        "[output]\nformat = \"json\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("a.sql"), "select 1").unwrap();

    let output = run_in(dir.path(), &["split", "a.sql"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value, serde_json::json!(["select 1"]));
}

#[test]
fn test_missing_default_config_warns() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.sql"), "select 1").unwrap();

    let output = run_in(dir.path(), &["split", "a.sql"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("not found, using defaults"));

    let quiet = run_in(dir.path(), &["--quiet", "split", "a.sql"]);
    assert!(quiet.status.success());
    assert!(stderr(&quiet).is_empty());
}

#[test]
fn test_missing_explicit_config_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.sql"), "select 1").unwrap();

    let output = run_in(dir.path(), &["--config", "missing.toml", "split", "a.sql"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Config file not found"));
}

#[test]
fn test_unknown_format_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.sql"), "select 1").unwrap();

    let output = run_in(dir.path(), &["split", "a.sql", "--format", "sarif"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown output format 'sarif'"));
}
