//! Single shared connection with a blocking-pool executor
//!
//! rusqlite connections are synchronous and not Sync, so the store keeps
//! exactly one behind an async mutex and runs every engine call inside
//! `spawn_blocking`. The mutex is fair, which gives the serialization
//! guarantee: calls against the same store complete in submission order.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use strata_core::StoreError;

use crate::error::engine_error;

/// Where the database lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// File-based database
    File(PathBuf),
    /// In-memory database (for testing)
    Memory,
}

/// Opens a connection with the store's pragma profile applied.
///
/// WAL keeps readers unblocked by the single writer; foreign keys are
/// enforced so constraint breaches surface as typed errors.
pub(crate) fn open_connection(location: &Location, busy_timeout_ms: u64) -> Result<Connection, StoreError> {
    let conn = match location {
        Location::File(path) => Connection::open(path).map_err(|e| StoreError::Open(e.to_string()))?,
        Location::Memory => Connection::open_in_memory().map_err(|e| StoreError::Open(e.to_string()))?,
    };

    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         PRAGMA foreign_keys=ON;
         PRAGMA temp_store=MEMORY;",
    )
    .map_err(|e| StoreError::Open(e.to_string()))?;
    conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms)).map_err(|e| StoreError::Open(e.to_string()))?;

    Ok(conn)
}

/// The store's exclusively owned connection.
///
/// All engine access funnels through [`with_connection`], which acquires
/// the lock and runs the closure on the blocking pool. The slot is `None`
/// once [`close`] has taken the connection down; later access fails with
/// [`StoreError::SessionClosed`].
///
/// [`with_connection`]: StoreConnection::with_connection
/// [`close`]: StoreConnection::close
#[derive(Debug)]
pub(crate) struct StoreConnection {
    inner: Arc<Mutex<Option<Connection>>>,
}

impl StoreConnection {
    pub(crate) fn new(conn: Connection) -> Self { Self { inner: Arc::new(Mutex::new(Some(conn))) } }

    pub(crate) async fn with_connection<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.blocking_lock();
            match guard.as_mut() {
                Some(conn) => f(conn),
                None => Err(StoreError::SessionClosed),
            }
        })
        .await
        .map_err(|e| StoreError::Engine(Box::new(e)))?
    }

    /// Takes the connection out of the slot and closes it, releasing the
    /// file handle. Idempotent: a second call finds the slot empty.
    pub(crate) async fn close(&self) -> Result<(), StoreError> {
        let conn = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.blocking_lock();
            match guard.take() {
                Some(conn) => conn.close().map_err(|(_, e)| engine_error(e)),
                None => Ok(()),
            }
        })
        .await
        .map_err(|e| StoreError::Engine(Box::new(e)))?
    }
}

/// Checks that the target table exists, translating its absence into the
/// typed error instead of an opaque engine failure.
pub(crate) fn ensure_table(conn: &Connection, table: &str) -> Result<(), StoreError> {
    let mut stmt = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .map_err(engine_error)?;
    let exists = stmt.exists([table]).map_err(engine_error)?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::UnknownTable(table.to_string()))
    }
}
