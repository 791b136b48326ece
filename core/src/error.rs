//! Public error taxonomy for Strata stores
//!
//! Every public store operation resolves to either a success value or one
//! of these kinds; nothing is silently swallowed and nothing is retried.
//! Retry policy belongs to the calling application.

use thiserror::Error;

use crate::predicate::PredicateError;

/// Error type for all store, cursor, transaction and migration operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database file could not be opened or initialized
    #[error("open failed: {0}")]
    Open(String),

    /// An upgrade migration step failed; the file remains at its prior version
    #[error("migration from version {from} to {to} failed: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },

    /// A downgrade migration step failed; the file remains at its prior version
    #[error("downgrade from version {from} to {to} failed: {reason}")]
    DowngradeFailed { from: u32, to: u32, reason: String },

    /// `begin` called while a transaction is already active
    #[error("a transaction is already active")]
    TransactionAlreadyActive,

    /// `commit` or `rollback` called with no transaction active
    #[error("no transaction is active")]
    NoActiveTransaction,

    /// Unique / not-null / foreign-key breach; the containing transaction
    /// is rolled back in full
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Target table does not exist
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Malformed predicate (empty column, negative limit/offset, or an
    /// unfiltered mutation without the affect-all opt-in)
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    /// A value could not be encoded as a supported scalar kind
    #[error("type coercion failed: {0}")]
    TypeCoercion(String),

    /// A stored value cannot be losslessly read through the requested accessor
    #[error("type mismatch: expected {expected}, found {found} in column '{column}'")]
    TypeMismatch { column: String, expected: &'static str, found: &'static str },

    /// A row handed to a write contained the same column twice
    #[error("duplicate column in row: {0}")]
    DuplicateColumn(String),

    /// Column name not present in the result set
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Cursor used after `close()`
    #[error("cursor is closed")]
    CursorClosed,

    /// Column accessor called while the cursor is before the first row or
    /// past the last row
    #[error("cursor is not positioned on a row")]
    CursorNotPositioned,

    /// Store used after `close()`
    #[error("session is closed")]
    SessionClosed,

    /// Engine-level failure that fits no narrower kind
    #[error("storage engine error: {0}")]
    Engine(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl From<PredicateError> for StoreError {
    fn from(error: PredicateError) -> Self { StoreError::InvalidPredicate(error.to_string()) }
}
