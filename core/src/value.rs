//! Scalar value type shared by rows, predicates and cursors

use serde::{Deserialize, Serialize};

/// A typed scalar as stored in a column.
///
/// These are exactly the storage classes the underlying engine supports;
/// anything richer (booleans, timestamps, JSON) is mapped onto them by the
/// caller or by the `From` impls below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Storage class name, matching the engine's column type vocabulary.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::Integer(i) }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self { Value::Integer(i as i64) }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self { Value::Real(f) }
}

impl From<bool> for Value {
    // Booleans are stored as INTEGER 0/1
    fn from(b: bool) -> Self { Value::Integer(if b { 1 } else { 0 }) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Text(s) }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self { Value::Blob(b) }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self { Value::Blob(b.to_vec()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Maps JSON scalars onto storage classes; arrays and objects are
    /// stored as their JSON text.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => b.into(),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Real(f)
                } else {
                    Value::Text(n.to_string())
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}
