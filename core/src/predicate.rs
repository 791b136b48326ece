//! Fluent, injection-safe predicate builder
//!
//! A [`Predicate`] is a pure data-structure accumulator: it records
//! conditions, ordering and limits against one target table, and is later
//! translated by a storage backend into a parameterized statement. Operand
//! values never appear in statement text.
//!
//! Conditions combine with logical AND, in call order. There is no OR or
//! grouping support.
//!
//! Invalid input (empty column name, negative limit/offset) poisons the
//! builder rather than aborting the fluent chain; the error surfaces when a
//! store consumes the predicate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PredicateError {
    #[error("empty table name")]
    EmptyTable,
    #[error("{operator} called with an empty column name")]
    EmptyColumn { operator: String },
    #[error("limit must be non-negative, got {0}")]
    NegativeLimit(i64),
    #[error("offset must be non-negative, got {0}")]
    NegativeOffset(i64),
    #[error("is_in called with an empty value list")]
    EmptyValueList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    In,
    IsNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// One AND-ed condition clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub operator: ComparisonOperator,
    /// One operand for binary operators, many for `In`, none for `IsNull`.
    pub operands: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: OrderDirection,
}

/// A structured filter/sort/limit description scoped to one table.
///
/// Immutable once handed to a store call (all builder methods take `self`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    table: String,
    conditions: Vec<Condition>,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
    affect_all: bool,
    error: Option<PredicateError>,
}

impl Predicate {
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        let error = table.is_empty().then_some(PredicateError::EmptyTable);
        Self { table, conditions: Vec::new(), order_by: Vec::new(), limit: None, offset: None, affect_all: false, error }
    }

    /// Explicit opt-in for update/delete with zero conditions. Without this
    /// mark, a store rejects unfiltered mutations instead of silently
    /// touching every row.
    pub fn affect_all(table: impl Into<String>) -> Self {
        let mut predicate = Self::new(table);
        predicate.affect_all = true;
        predicate
    }

    fn condition(mut self, operator: ComparisonOperator, name: &'static str, column: String, operands: Vec<Value>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if column.is_empty() {
            self.error = Some(PredicateError::EmptyColumn { operator: name.to_string() });
            return self;
        }
        self.conditions.push(Condition { column, operator, operands });
        self
    }

    pub fn equal_to(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(ComparisonOperator::Equal, "equal_to", column.into(), vec![value.into()])
    }

    pub fn not_equal_to(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(ComparisonOperator::NotEqual, "not_equal_to", column.into(), vec![value.into()])
    }

    pub fn greater_than(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(ComparisonOperator::GreaterThan, "greater_than", column.into(), vec![value.into()])
    }

    pub fn greater_than_or_equal_to(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(ComparisonOperator::GreaterThanOrEqual, "greater_than_or_equal_to", column.into(), vec![value.into()])
    }

    pub fn less_than(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(ComparisonOperator::LessThan, "less_than", column.into(), vec![value.into()])
    }

    pub fn less_than_or_equal_to(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(ComparisonOperator::LessThanOrEqual, "less_than_or_equal_to", column.into(), vec![value.into()])
    }

    pub fn like(self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.condition(ComparisonOperator::Like, "like", column.into(), vec![Value::Text(pattern.into())])
    }

    pub fn is_in(self, column: impl Into<String>, values: Vec<Value>) -> Self {
        let mut this = self;
        if this.error.is_none() && values.is_empty() {
            this.error = Some(PredicateError::EmptyValueList);
            return this;
        }
        this.condition(ComparisonOperator::In, "is_in", column.into(), values)
    }

    pub fn is_null(self, column: impl Into<String>) -> Self {
        self.condition(ComparisonOperator::IsNull, "is_null", column.into(), Vec::new())
    }

    pub fn order_by_asc(self, column: impl Into<String>) -> Self { self.order(column.into(), OrderDirection::Asc) }

    pub fn order_by_desc(self, column: impl Into<String>) -> Self { self.order(column.into(), OrderDirection::Desc) }

    fn order(mut self, column: String, direction: OrderDirection) -> Self {
        if self.error.is_some() {
            return self;
        }
        if column.is_empty() {
            self.error = Some(PredicateError::EmptyColumn { operator: "order_by".to_string() });
            return self;
        }
        self.order_by.push(OrderBy { column, direction });
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        if self.error.is_some() {
            return self;
        }
        if n < 0 {
            self.error = Some(PredicateError::NegativeLimit(n));
            return self;
        }
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        if self.error.is_some() {
            return self;
        }
        if n < 0 {
            self.error = Some(PredicateError::NegativeOffset(n));
            return self;
        }
        self.offset = Some(n);
        self
    }

    /// Surfaces any poisoned builder error. Stores call this before
    /// translating the predicate.
    pub fn check(&self) -> Result<(), PredicateError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    pub fn table(&self) -> &str { &self.table }

    pub fn conditions(&self) -> &[Condition] { &self.conditions }

    pub fn order_by(&self) -> &[OrderBy] { &self.order_by }

    pub fn limit_value(&self) -> Option<i64> { self.limit }

    pub fn offset_value(&self) -> Option<i64> { self.offset }

    /// True when the caller opted into unfiltered mutation.
    pub fn affects_all(&self) -> bool { self.affect_all }
}
