//! Store session: the open handle to one database file
//!
//! Exactly one [`Store`] exists per open file; it exclusively owns the
//! connection, routes every statement through the single fair lock (so
//! calls against one store serialize in submission order), and runs the
//! migration controller before the session becomes ready.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use rusqlite::params_from_iter;
use tracing::{debug, warn};

use strata_core::{Predicate, Row, StoreError};

use crate::codec::{bind_values, encode_row};
use crate::connection::{ensure_table, open_connection, Location, StoreConnection};
use crate::cursor::Cursor;
use crate::error::engine_error;
use crate::migration::{self, MigrationStep, RegisteredStep};
use crate::sql_builder::SqlBuilder;
use crate::transaction::TransactionManager;

/// Default busy timeout while another process holds the file lock (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration for opening a store.
pub struct StoreConfig {
    location: Location,
    version: u32,
    encrypted: bool,
    busy_timeout_ms: u64,
    on_upgrade: Vec<RegisteredStep>,
    on_downgrade: Vec<RegisteredStep>,
}

impl StoreConfig {
    /// File-backed store at `path`, to be opened at schema version `version`.
    pub fn file(path: impl Into<PathBuf>, version: u32) -> Self {
        Self::new(Location::File(path.into()), version)
    }

    /// In-memory store (for testing).
    pub fn in_memory(version: u32) -> Self { Self::new(Location::Memory, version) }

    fn new(location: Location, version: u32) -> Self {
        Self {
            location,
            version,
            encrypted: false,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            on_upgrade: Vec::new(),
            on_downgrade: Vec::new(),
        }
    }

    /// Registers the upgrade step for the `from` → `from + 1` transition.
    pub fn on_upgrade(mut self, from: u32, step: impl MigrationStep + 'static) -> Self {
        self.on_upgrade.push(RegisteredStep { from, to: from + 1, step: Box::new(step) });
        self
    }

    /// Registers the downgrade step for the `from` → `from - 1` transition.
    pub fn on_downgrade(mut self, from: u32, step: impl MigrationStep + 'static) -> Self {
        self.on_downgrade.push(RegisteredStep { from, to: from.saturating_sub(1), step: Box::new(step) });
        self
    }

    pub fn busy_timeout_ms(mut self, ms: u64) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// Accepted for configuration-surface compatibility; opening an
    /// encrypted store is not supported and fails with a typed error.
    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }
}

/// An open session over one database file.
///
/// All operations are `async`; file I/O runs on the blocking pool and never
/// stalls unrelated tasks. The session must be explicitly closed; after
/// `close()` every call fails with [`StoreError::SessionClosed`].
#[derive(Debug)]
pub struct Store {
    connection: StoreConnection,
    transactions: TransactionManager,
    closed: AtomicBool,
}

impl Store {
    /// Opens the store, running the migration controller first: the target
    /// version is compared with the file's persisted version and the
    /// registered step sequence is applied inside one transaction. On any
    /// migration failure the file keeps its prior version and `open` fails.
    pub async fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if config.encrypted {
            return Err(StoreError::Open("encrypted stores are not supported".to_string()));
        }
        let StoreConfig { location, version, busy_timeout_ms, on_upgrade, on_downgrade, .. } = config;
        let conn = tokio::task::spawn_blocking(move || {
            let mut conn = open_connection(&location, busy_timeout_ms)?;
            migration::run(&mut conn, version, &on_upgrade, &on_downgrade)?;
            Ok::<_, StoreError>(conn)
        })
        .await
        .map_err(|e| StoreError::Engine(Box::new(e)))??;

        Ok(Self { connection: StoreConnection::new(conn), transactions: TransactionManager::default(), closed: AtomicBool::new(false) })
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StoreError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Guard for mutations: a zero-condition predicate touches every row,
    /// which callers must opt into explicitly via [`Predicate::affect_all`].
    fn ensure_filtered(predicate: &Predicate) -> Result<(), StoreError> {
        if predicate.conditions().is_empty() && !predicate.affects_all() {
            return Err(StoreError::InvalidPredicate(
                "predicate has no conditions; use Predicate::affect_all to mutate every row".to_string(),
            ));
        }
        Ok(())
    }

    /// Inserts one row, returning the engine-assigned row identifier.
    pub async fn insert(&self, table: &str, row: Row) -> Result<i64, StoreError> {
        self.ensure_open()?;
        let (columns, values) = encode_row(&row)?;
        let (sql, params) = SqlBuilder::insert(table, &columns, values);
        debug!(%sql, "insert");
        let table = table.to_string();
        self.connection
            .with_connection(move |c| {
                ensure_table(c, &table)?;
                c.execute(&sql, params_from_iter(params)).map_err(engine_error)?;
                Ok(c.last_insert_rowid())
            })
            .await
    }

    /// Updates rows matched by the predicate, returning the affected count.
    pub async fn update(&self, row: Row, predicate: &Predicate) -> Result<u64, StoreError> {
        self.ensure_open()?;
        predicate.check()?;
        Self::ensure_filtered(predicate)?;
        let (columns, values) = encode_row(&row)?;
        let (sql, params) = SqlBuilder::update(predicate, &columns, values)?;
        debug!(%sql, "update");
        let table = predicate.table().to_string();
        self.connection
            .with_connection(move |c| {
                ensure_table(c, &table)?;
                let affected = c.execute(&sql, params_from_iter(params)).map_err(engine_error)?;
                Ok(affected as u64)
            })
            .await
    }

    /// Deletes rows matched by the predicate, returning the affected count.
    pub async fn delete(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.ensure_open()?;
        predicate.check()?;
        Self::ensure_filtered(predicate)?;
        let (sql, params) = SqlBuilder::delete(predicate)?;
        debug!(%sql, "delete");
        let table = predicate.table().to_string();
        self.connection
            .with_connection(move |c| {
                ensure_table(c, &table)?;
                let affected = c.execute(&sql, params_from_iter(params)).map_err(engine_error)?;
                Ok(affected as u64)
            })
            .await
    }

    /// Queries rows matched by the predicate. An empty column slice selects
    /// every column. The returned cursor is a snapshot; the caller must
    /// close it.
    pub async fn query(&self, predicate: &Predicate, columns: &[&str]) -> Result<Cursor, StoreError> {
        self.ensure_open()?;
        let (sql, params) = SqlBuilder::select(predicate, columns)?;
        debug!(%sql, "query");
        let table = predicate.table().to_string();
        self.connection
            .with_connection(move |c| {
                ensure_table(c, &table)?;
                run_query(c, &sql, params)
            })
            .await
    }

    /// Runs an arbitrary query. Values bind positionally; statement text
    /// must not embed caller values.
    pub async fn query_sql(&self, sql: &str, args: &[strata_core::Value]) -> Result<Cursor, StoreError> {
        self.ensure_open()?;
        let sql = sql.to_string();
        let params = bind_values(args);
        debug!(%sql, "query_sql");
        self.connection.with_connection(move |c| run_query(c, &sql, params)).await
    }

    /// Executes an arbitrary non-query statement, returning the affected
    /// row count.
    pub async fn execute_sql(&self, sql: &str, args: &[strata_core::Value]) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let sql = sql.to_string();
        let params = bind_values(args);
        debug!(%sql, "execute_sql");
        self.connection
            .with_connection(move |c| {
                let affected = c.execute(&sql, params_from_iter(params)).map_err(engine_error)?;
                Ok(affected as u64)
            })
            .await
    }

    /// Begins an explicit transaction. Fails if one is already active.
    pub async fn begin_transaction(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.transactions.begin(&self.connection).await
    }

    /// Commits the active transaction; all-or-nothing.
    pub async fn commit(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.transactions.commit(&self.connection).await
    }

    /// Discards the active transaction's buffered effects.
    pub async fn roll_back(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.transactions.roll_back(&self.connection).await
    }

    /// The file's persisted schema version.
    pub async fn version(&self) -> Result<u32, StoreError> {
        self.ensure_open()?;
        self.connection.with_connection(|c| migration::read_version(c)).await
    }

    /// Explicitly sets the persisted schema version without running any
    /// migration step.
    pub async fn set_version(&self, version: u32) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.connection.with_connection(move |c| migration::write_version(c, version)).await
    }

    /// Closes the session, releasing the underlying file handle. An active
    /// transaction is rolled back first. Terminal: every later call fails
    /// with [`StoreError::SessionClosed`].
    pub async fn close(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        if self.transactions.is_active() {
            warn!("store closed with an active transaction; rolling back");
            self.transactions.roll_back(&self.connection).await?;
        }
        self.closed.store(true, Ordering::SeqCst);
        self.connection.close().await
    }
}

/// Prepares and materializes a query into a cursor snapshot.
fn run_query(conn: &rusqlite::Connection, sql: &str, params: Vec<rusqlite::types::Value>) -> Result<Cursor, StoreError> {
    let mut stmt = conn.prepare(sql).map_err(engine_error)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let mut rows = stmt.query(params_from_iter(params)).map_err(engine_error)?;
    let mut buffered: Vec<Vec<strata_core::Value>> = Vec::new();
    while let Some(row) = rows.next().map_err(engine_error)? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            let value: rusqlite::types::Value = row.get(i).map_err(engine_error)?;
            values.push(crate::codec::from_engine(value));
        }
        buffered.push(values);
    }
    Ok(Cursor::new(columns, buffered))
}
