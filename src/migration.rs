//! Running reversible migration bodies in either direction
//!
//! A reversible ("change") migration is written once, as the forward steps.
//! Migrating up runs it against the real executor. Migrating down runs it
//! against a [`ProxyExecutor`] first, then replays the inverted record
//! against the real executor.

use crate::executor::{ExecuteError, Executor, ProxyExecutor};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    Up,
    Down,
}

/// Run `body` in `direction` against `executor`.
///
/// When migrating down, `body` never touches `executor`: its calls are
/// recorded, inverted and replayed. A body containing an irreversible action
/// fails before anything reaches `executor`.
pub fn run_change<E, F>(
    direction: Direction,
    executor: &mut E,
    body: F,
) -> Result<(), ExecuteError>
where
    E: Executor,
    F: FnOnce(&mut dyn Executor) -> Result<(), ExecuteError>,
{
    tracing::debug!(%direction, "running reversible migration");
    match direction {
        Direction::Up => body(executor),
        Direction::Down => {
            let mut proxy = ProxyExecutor::new();
            body(&mut proxy)?;
            proxy.execute_inverted(executor)
        }
    }
}
