//! Explicit transaction state machine
//!
//! One state machine per store: `Idle` → `begin` → `Active` → `commit` or
//! `roll_back` → `Idle`. Nested `begin` and commit/rollback without an
//! active transaction are state-machine misuse and fail with their own
//! error kinds.
//!
//! The transaction itself is the engine's: `BEGIN IMMEDIATE` takes the
//! write lock up front (single-writer discipline), and every CRUD call
//! issued while `Active` lands inside the same atomic unit because the
//! store funnels all statements through the one shared connection. A
//! process crash discards the uncommitted unit via the engine journal.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use strata_core::StoreError;

use crate::connection::StoreConnection;
use crate::error::engine_error;

#[derive(Debug, Default)]
pub(crate) struct TransactionManager {
    active: AtomicBool,
}

impl TransactionManager {
    pub(crate) fn is_active(&self) -> bool { self.active.load(Ordering::SeqCst) }

    pub(crate) async fn begin(&self, conn: &StoreConnection) -> Result<(), StoreError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(StoreError::TransactionAlreadyActive);
        }
        debug!("begin transaction");
        let result = conn.with_connection(|c| c.execute_batch("BEGIN IMMEDIATE").map_err(engine_error)).await;
        if result.is_err() {
            self.active.store(false, Ordering::SeqCst);
        }
        result
    }

    /// All-or-nothing: when the engine refuses the commit (e.g. a deferred
    /// constraint), the unit is rolled back in full before the error is
    /// surfaced, so no partial effects can remain.
    pub(crate) async fn commit(&self, conn: &StoreConnection) -> Result<(), StoreError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(StoreError::NoActiveTransaction);
        }
        debug!("commit transaction");
        conn.with_connection(|c| {
            if let Err(commit_err) = c.execute_batch("COMMIT") {
                // Discard the unit entirely; a failed commit must not leave
                // a half-applied transaction open on the connection.
                let _ = c.execute_batch("ROLLBACK");
                return Err(engine_error(commit_err));
            }
            Ok(())
        })
        .await
    }

    pub(crate) async fn roll_back(&self, conn: &StoreConnection) -> Result<(), StoreError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(StoreError::NoActiveTransaction);
        }
        debug!("roll back transaction");
        conn.with_connection(|c| c.execute_batch("ROLLBACK").map_err(engine_error)).await
    }
}
