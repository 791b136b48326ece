//! Row ⇄ bind-parameter translation
//!
//! The codec is the only place where caller values become engine values.
//! Column order is preserved so positional `?` placeholders line up with
//! the bound argument list.

use thiserror::Error;

use strata_core::{Row, StoreError, Value};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum CodecError {
    #[error("row has no columns")]
    EmptyRow,
    #[error("row contains an empty column name")]
    EmptyColumnName,
    #[error("duplicate column in row: {0}")]
    DuplicateColumn(String),
}

impl From<CodecError> for StoreError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::DuplicateColumn(column) => StoreError::DuplicateColumn(column),
            other => StoreError::TypeCoercion(other.to_string()),
        }
    }
}

/// Converts a caller value to an engine bind value.
pub(crate) fn to_engine(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Real(f) => rusqlite::types::Value::Real(*f),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Blob(b) => rusqlite::types::Value::Blob(b.clone()),
    }
}

/// Converts a raw engine value back into the caller-facing scalar.
pub(crate) fn from_engine(value: rusqlite::types::Value) -> Value {
    match value {
        rusqlite::types::Value::Null => Value::Null,
        rusqlite::types::Value::Integer(i) => Value::Integer(i),
        rusqlite::types::Value::Real(f) => Value::Real(f),
        rusqlite::types::Value::Text(s) => Value::Text(s),
        rusqlite::types::Value::Blob(b) => Value::Blob(b),
    }
}

pub(crate) fn bind_values(values: &[Value]) -> Vec<rusqlite::types::Value> { values.iter().map(to_engine).collect() }

/// Encodes a row into parallel column-name and bound-value lists for a
/// write statement. Rejects empty rows, empty column names, and duplicate
/// column names.
pub fn encode_row(row: &Row) -> Result<(Vec<String>, Vec<rusqlite::types::Value>), StoreError> {
    if row.is_empty() {
        return Err(CodecError::EmptyRow.into());
    }
    let mut columns: Vec<String> = Vec::with_capacity(row.len());
    let mut values: Vec<rusqlite::types::Value> = Vec::with_capacity(row.len());
    for (column, value) in row.iter() {
        if column.is_empty() {
            return Err(CodecError::EmptyColumnName.into());
        }
        if columns.iter().any(|existing| existing == column) {
            return Err(CodecError::DuplicateColumn(column.to_string()).into());
        }
        columns.push(column.to_string());
        values.push(to_engine(value));
    }
    Ok((columns, values))
}

/// Decodes one raw engine row into a caller-facing [`Row`].
pub fn decode_row(columns: &[String], values: Vec<rusqlite::types::Value>) -> Row {
    Row::from_pairs(columns.iter().cloned().zip(values.into_iter().map(from_engine)).collect())
}
