//! Schema-version-driven migration controller
//!
//! The persisted schema version is the file's `user_version` header field,
//! read at open and rewritten inside the same transaction that applies a
//! migration's schema changes, so version bump and schema change commit
//! atomically or not at all.
//!
//! Steps are registered per adjacent version transition before open. On
//! open with target V and persisted P, the controller runs P→P+1 … V-1→V
//! (or the symmetric descending path on downgrade) inside one transaction;
//! any step failure, including a missing step for a required transition,
//! rolls the whole run back and leaves the file at P.

use rusqlite::{params_from_iter, Connection, TransactionBehavior};
use tracing::debug;

use strata_core::{Row, StoreError, Value};

use crate::codec::{bind_values, decode_row};
use crate::error::engine_error;

/// One versioned schema/data transformation.
///
/// Steps run synchronously on the blocking pool with the migration
/// transaction already open; every statement they execute joins that
/// transaction. Implemented for plain closures.
pub trait MigrationStep: Send + Sync {
    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), StoreError>;
}

impl<F> MigrationStep for F
where
    F: Fn(&mut StepContext<'_>) -> Result<(), StoreError> + Send + Sync,
{
    fn apply(&self, ctx: &mut StepContext<'_>) -> Result<(), StoreError> { self(ctx) }
}

/// Execution surface handed to a step: parameterized SQL against the
/// in-flight migration transaction, plus the versions being crossed.
pub struct StepContext<'a> {
    conn: &'a Connection,
    from: u32,
    to: u32,
}

impl StepContext<'_> {
    pub fn from_version(&self) -> u32 { self.from }

    pub fn to_version(&self) -> u32 { self.to }

    /// Executes one statement; values bind positionally.
    pub fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, StoreError> {
        let affected = self.conn.execute(sql, params_from_iter(bind_values(args))).map_err(engine_error)?;
        Ok(affected as u64)
    }

    /// Runs a query and materializes the result, for data migrations that
    /// need to read before rewriting.
    pub fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>, StoreError> {
        let mut stmt = self.conn.prepare(sql).map_err(engine_error)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut rows = stmt.query(params_from_iter(bind_values(args))).map_err(engine_error)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(engine_error)? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value: rusqlite::types::Value = row.get(i).map_err(engine_error)?;
                values.push(value);
            }
            out.push(decode_row(&columns, values));
        }
        Ok(out)
    }
}

/// A step bound to its version transition.
pub(crate) struct RegisteredStep {
    pub(crate) from: u32,
    pub(crate) to: u32,
    pub(crate) step: Box<dyn MigrationStep>,
}

pub(crate) fn read_version(conn: &Connection) -> Result<u32, StoreError> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0)).map_err(engine_error)?;
    u32::try_from(version).map_err(|_| StoreError::Open(format!("file carries invalid schema version {}", version)))
}

pub(crate) fn write_version(conn: &Connection, version: u32) -> Result<(), StoreError> {
    // A pragma cannot take bind parameters; the value is an integer we
    // formatted ourselves, so inlining it is safe.
    conn.execute_batch(&format!("PRAGMA user_version = {}", version)).map_err(engine_error)
}

/// Brings the file from its persisted version to `target`. No-op when the
/// versions already agree.
pub(crate) fn run(
    conn: &mut Connection,
    target: u32,
    upgrades: &[RegisteredStep],
    downgrades: &[RegisteredStep],
) -> Result<(), StoreError> {
    let persisted = read_version(conn)?;
    if persisted == target {
        debug!(version = persisted, "schema version is current, no migration");
        return Ok(());
    }

    let upgrading = target > persisted;
    debug!(from = persisted, to = target, upgrading, "running migrations");

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).map_err(engine_error)?;

    let transitions: Vec<(u32, u32)> = if upgrading {
        (persisted..target).map(|v| (v, v + 1)).collect()
    } else {
        ((target + 1)..=persisted).rev().map(|v| (v, v - 1)).collect()
    };

    for (from, to) in transitions {
        let registry = if upgrading { upgrades } else { downgrades };
        let Some(registered) = registry.iter().find(|s| s.from == from && s.to == to) else {
            return Err(step_failure(upgrading, from, to, "no registered migration step".to_string()));
        };
        debug!(from, to, "applying migration step");
        let mut ctx = StepContext { conn: &*tx, from, to };
        registered.step.apply(&mut ctx).map_err(|err| step_failure(upgrading, from, to, err.to_string()))?;
    }

    write_version(&*tx, target)?;
    // Dropping the transaction without commit rolls everything back,
    // including the version write
    tx.commit().map_err(engine_error)?;
    debug!(version = target, "migration committed");
    Ok(())
}

fn step_failure(upgrading: bool, from: u32, to: u32, reason: String) -> StoreError {
    if upgrading {
        StoreError::MigrationFailed { from, to, reason }
    } else {
        StoreError::DowngradeFailed { from, to, reason }
    }
}
