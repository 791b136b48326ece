//! Core model for Strata stores
//!
//! Everything in this crate is engine-independent: the scalar [`Value`]
//! type, the ordered [`Row`] mapping used for writes and reads, the fluent
//! [`Predicate`] builder, and the [`StoreError`] taxonomy shared by every
//! storage backend.

pub mod error;
pub mod predicate;
pub mod row;
pub mod value;

pub use error::StoreError;
pub use predicate::{ComparisonOperator, Condition, OrderBy, OrderDirection, Predicate};
pub use row::Row;
pub use value::Value;
