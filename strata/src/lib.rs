//! # Strata
//!
//! A small embedded relational storage layer: one SQLite file per store,
//! a single writer, fluent injection-safe predicates, cursor-based reads,
//! explicit transactions, and schema-version-driven migration run at open
//! time.
//!
//! This crate is the single import point; it re-exports the core model and
//! the SQLite-backed store.
//!
//! ```rust,ignore
//! use strata::{Predicate, Row, Store, StoreConfig};
//!
//! let store = Store::open(
//!     StoreConfig::file("app.db", 2)
//!         .on_upgrade(0, |ctx: &mut strata::StepContext| {
//!             ctx.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)", &[])?;
//!             Ok(())
//!         })
//!         .on_upgrade(1, |ctx: &mut strata::StepContext| {
//!             ctx.execute("ALTER TABLE users ADD COLUMN email TEXT", &[])?;
//!             Ok(())
//!         }),
//! )
//! .await?;
//!
//! let id = store.insert("users", Row::new().set("name", "alice")).await?;
//! let mut cursor = store.query(&Predicate::new("users").equal_to("id", id), &[]).await?;
//! assert!(cursor.go_to_next_row()?);
//! cursor.close();
//! store.close().await?;
//! ```

pub use strata_core::{ComparisonOperator, Condition, OrderBy, OrderDirection, Predicate, Row, StoreError, Value};
pub use strata_storage_sqlite::{Cursor, Location, MigrationStep, StepContext, Store, StoreConfig};
