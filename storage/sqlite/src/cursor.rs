//! Cursor over a materialized query snapshot
//!
//! Query results are collected into owned rows while the connection lock is
//! held, so a cursor is a read-only snapshot: it holds no engine resources
//! beyond its buffer and never observes later writes. Rows handed out are
//! copies; mutating them cannot affect the file.
//!
//! Lifecycle: open (before the first row) → positioned → exhausted →
//! closed. Closing is an explicit caller obligation; a leaked cursor is a
//! buffer leak the store does not recover.

use strata_core::{Row, StoreError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeFirst,
    At(usize),
    Exhausted,
}

/// Forward-iterable, randomly addressable view over query output.
#[derive(Debug)]
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    position: Position,
    closed: bool,
}

impl Cursor {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows, position: Position::BeforeFirst, closed: false }
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            Err(StoreError::CursorClosed)
        } else {
            Ok(())
        }
    }

    pub fn row_count(&self) -> Result<usize, StoreError> {
        self.ensure_open()?;
        Ok(self.rows.len())
    }

    pub fn column_names(&self) -> Result<&[String], StoreError> {
        self.ensure_open()?;
        Ok(&self.columns)
    }

    /// Resolves a column name to its index for the positional accessors.
    pub fn column_index(&self, name: &str) -> Result<usize, StoreError> {
        self.ensure_open()?;
        self.columns.iter().position(|c| c == name).ok_or_else(|| StoreError::ColumnNotFound(name.to_string()))
    }

    /// Positions at the first row. Returns false on an empty result.
    pub fn go_to_first_row(&mut self) -> Result<bool, StoreError> { self.go_to_row(0) }

    /// Advances one row. Returns false once the position passes the last
    /// row; repeated calls at exhaustion keep returning false.
    pub fn go_to_next_row(&mut self) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let next = match self.position {
            Position::BeforeFirst => 0,
            Position::At(i) => i + 1,
            Position::Exhausted => return Ok(false),
        };
        if next < self.rows.len() {
            self.position = Position::At(next);
            Ok(true)
        } else {
            self.position = Position::Exhausted;
            Ok(false)
        }
    }

    /// Positions at an absolute zero-based row index. Out-of-range indexes
    /// exhaust the cursor and return false, mirroring `go_to_next_row`.
    pub fn go_to_row(&mut self, n: usize) -> Result<bool, StoreError> {
        self.ensure_open()?;
        if n < self.rows.len() {
            self.position = Position::At(n);
            Ok(true)
        } else {
            self.position = Position::Exhausted;
            Ok(false)
        }
    }

    fn current(&self) -> Result<&[Value], StoreError> {
        self.ensure_open()?;
        match self.position {
            Position::At(i) => Ok(&self.rows[i]),
            _ => Err(StoreError::CursorNotPositioned),
        }
    }

    fn value_at(&self, index: usize) -> Result<&Value, StoreError> {
        let row = self.current()?;
        row.get(index).ok_or_else(|| StoreError::ColumnNotFound(format!("index {}", index)))
    }

    fn mismatch(&self, index: usize, expected: &'static str, found: &Value) -> StoreError {
        let column = self.columns.get(index).cloned().unwrap_or_else(|| format!("index {}", index));
        StoreError::TypeMismatch { column, expected, found: found.type_name() }
    }

    pub fn get_string(&self, index: usize) -> Result<String, StoreError> {
        match self.value_at(index)? {
            Value::Text(s) => Ok(s.clone()),
            other => Err(self.mismatch(index, "TEXT", other)),
        }
    }

    /// Integer accessor. Reals are accepted only when integral; a lossy
    /// read is a coercion failure, not a silent truncation.
    pub fn get_long(&self, index: usize) -> Result<i64, StoreError> {
        match self.value_at(index)? {
            Value::Integer(i) => Ok(*i),
            // The upper bound is strict: i64::MAX as f64 rounds up to 2^63,
            // which is not a valid i64 and would saturate on the cast.
            Value::Real(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => Ok(*f as i64),
            Value::Real(f) => Err(StoreError::TypeCoercion(format!("REAL value {} does not fit an integer", f))),
            other => Err(self.mismatch(index, "INTEGER", other)),
        }
    }

    pub fn get_double(&self, index: usize) -> Result<f64, StoreError> {
        match self.value_at(index)? {
            Value::Real(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            other => Err(self.mismatch(index, "REAL", other)),
        }
    }

    pub fn get_blob(&self, index: usize) -> Result<Vec<u8>, StoreError> {
        match self.value_at(index)? {
            Value::Blob(b) => Ok(b.clone()),
            other => Err(self.mismatch(index, "BLOB", other)),
        }
    }

    pub fn is_column_null(&self, index: usize) -> Result<bool, StoreError> { Ok(self.value_at(index)?.is_null()) }

    pub fn get_string_by_name(&self, name: &str) -> Result<String, StoreError> { self.get_string(self.column_index(name)?) }

    pub fn get_long_by_name(&self, name: &str) -> Result<i64, StoreError> { self.get_long(self.column_index(name)?) }

    pub fn get_double_by_name(&self, name: &str) -> Result<f64, StoreError> { self.get_double(self.column_index(name)?) }

    pub fn get_blob_by_name(&self, name: &str) -> Result<Vec<u8>, StoreError> { self.get_blob(self.column_index(name)?) }

    /// Copies the current row out as a [`Row`] value.
    pub fn get_row(&self) -> Result<Row, StoreError> {
        let values = self.current()?.to_vec();
        Ok(Row::from_pairs(self.columns.iter().cloned().zip(values).collect()))
    }

    /// Releases the snapshot. Terminal: every later access fails with
    /// [`StoreError::CursorClosed`].
    pub fn close(&mut self) {
        self.closed = true;
        self.rows = Vec::new();
        self.columns = Vec::new();
    }
}
