//! SQLite-backed Strata store
//!
//! A single-file, single-writer, transactional row store sitting between an
//! application and the embedded SQLite engine:
//!
//! - One [`Store`] per database file, exclusively owning the connection
//! - Fluent [`Predicate`](strata_core::Predicate)s translated to
//!   parameterized statements (values never appear in SQL text)
//! - Explicit-lifecycle [`Cursor`]s over materialized query snapshots
//! - `begin`/`commit`/`roll_back` with single-writer mutual exclusion and
//!   nested-call rejection
//! - Schema-version-driven migrations run atomically at open time, with the
//!   persisted version kept in the file's `user_version` header field
//!
//! All public store operations are `async`: file I/O runs on the blocking
//! pool so unrelated tasks are never stalled, while calls against the same
//! store serialize in submission order.
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_storage_sqlite::{Store, StoreConfig};
//! use strata_core::{Predicate, Row};
//!
//! let store = Store::open(StoreConfig::file("app.db", 1)).await?;
//! let id = store.insert("users", Row::new().set("name", "alice")).await?;
//! let mut cursor = store.query(&Predicate::new("users").equal_to("rowid", id), &[]).await?;
//! while cursor.go_to_next_row()? {
//!     println!("{}", cursor.get_string(cursor.column_index("name")?)?);
//! }
//! cursor.close();
//! ```

mod codec;
mod connection;
mod cursor;
mod error;
mod migration;
mod session;
pub mod sql_builder;
mod transaction;

pub use codec::{decode_row, encode_row};
pub use connection::Location;
pub use cursor::Cursor;
pub use migration::{MigrationStep, StepContext};
pub use session::{Store, StoreConfig};
