//! Ordered column → value mapping used for writes and query results

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// An ordered mapping from column name to [`Value`].
///
/// Insertion order is significant: the codec aligns positional bind
/// arguments with it. A `Row` is a plain value, not a resource: rows
/// returned by a cursor are copies and never write through to the file.
///
/// Duplicate column names are representable here but rejected by the codec
/// when the row is encoded for a write.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self { Self::default() }

    /// Append a column. Fluent, like the predicate builder.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((column.into(), value.into()));
        self
    }

    /// Value for the first column with this name, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.iter().find(|(name, _)| name == column).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize { self.columns.len() }

    pub fn is_empty(&self) -> bool { self.columns.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Build a row from parallel column/value lists, as decoded from the
    /// engine. Lengths must already agree.
    pub fn from_pairs(columns: Vec<(String, Value)>) -> Self { Self { columns } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let row = Row::new().set("b", 1i64).set("a", "x").set("c", Value::Null);
        let names: Vec<&str> = row.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn get_finds_first_match() {
        let row = Row::new().set("a", 1i64).set("a", 2i64);
        assert_eq!(row.get("a"), Some(&Value::Integer(1)));
        assert_eq!(row.get("missing"), None);
    }
}
