//! SQL builder for store statements
//!
//! Translates predicates and encoded rows into parameterized SQL with
//! positional `?` placeholders. Caller values only ever travel through the
//! bound parameter list; identifiers are double-quoted with `"` doubling.
//!
//! ORDER BY / LIMIT / OFFSET apply to SELECT only: the bundled engine does
//! not compile UPDATE/DELETE limits, and mutations are already scoped by
//! the predicate's conditions.

use strata_core::{ComparisonOperator, OrderDirection, Predicate, StoreError};

use crate::codec::to_engine;

/// Quotes an identifier for safe embedding in statement text.
fn ident(name: &str) -> String { format!(r#""{}""#, name.replace('"', "\"\"")) }

/// Accumulates statement text and its positional bind parameters.
pub struct SqlBuilder {
    sql: String,
    params: Vec<rusqlite::types::Value>,
}

impl Default for SqlBuilder {
    fn default() -> Self { Self::new() }
}

impl SqlBuilder {
    pub fn new() -> Self { Self { sql: String::new(), params: Vec::new() } }

    fn push_sql(&mut self, s: &str) { self.sql.push_str(s); }

    fn push_param(&mut self, value: rusqlite::types::Value) {
        self.sql.push('?');
        self.params.push(value);
    }

    pub fn build(self) -> (String, Vec<rusqlite::types::Value>) { (self.sql, self.params) }

    /// `SELECT <columns> FROM <table> [WHERE ...] [ORDER BY ...] [LIMIT ...]`.
    /// An empty column slice selects `*`.
    pub fn select(predicate: &Predicate, columns: &[&str]) -> Result<(String, Vec<rusqlite::types::Value>), StoreError> {
        predicate.check()?;
        let mut builder = Self::new();
        let fields = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.iter().map(|c| ident(c)).collect::<Vec<_>>().join(", ")
        };
        builder.push_sql(&format!("SELECT {} FROM {}", fields, ident(predicate.table())));
        builder.where_clause(predicate);
        builder.order_and_range(predicate);
        Ok(builder.build())
    }

    /// `UPDATE <table> SET ... [WHERE ...]` from an already-encoded row.
    pub fn update(
        predicate: &Predicate,
        columns: &[String],
        values: Vec<rusqlite::types::Value>,
    ) -> Result<(String, Vec<rusqlite::types::Value>), StoreError> {
        predicate.check()?;
        let mut builder = Self::new();
        builder.push_sql(&format!("UPDATE {} SET ", ident(predicate.table())));
        for (i, (column, value)) in columns.iter().zip(values).enumerate() {
            if i > 0 {
                builder.push_sql(", ");
            }
            builder.push_sql(&format!("{} = ", ident(column)));
            builder.push_param(value);
        }
        builder.where_clause(predicate);
        Ok(builder.build())
    }

    /// `DELETE FROM <table> [WHERE ...]`.
    pub fn delete(predicate: &Predicate) -> Result<(String, Vec<rusqlite::types::Value>), StoreError> {
        predicate.check()?;
        let mut builder = Self::new();
        builder.push_sql(&format!("DELETE FROM {}", ident(predicate.table())));
        builder.where_clause(predicate);
        Ok(builder.build())
    }

    /// `INSERT INTO <table> (...) VALUES (...)` from an encoded row.
    pub fn insert(
        table: &str,
        columns: &[String],
        values: Vec<rusqlite::types::Value>,
    ) -> (String, Vec<rusqlite::types::Value>) {
        let mut builder = Self::new();
        let names = columns.iter().map(|c| ident(c)).collect::<Vec<_>>().join(", ");
        builder.push_sql(&format!("INSERT INTO {} ({}) VALUES (", ident(table), names));
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                builder.push_sql(", ");
            }
            builder.push_param(value);
        }
        builder.push_sql(")");
        builder.build()
    }

    fn where_clause(&mut self, predicate: &Predicate) {
        for (i, condition) in predicate.conditions().iter().enumerate() {
            self.push_sql(if i == 0 { " WHERE " } else { " AND " });
            let column = ident(&condition.column);
            match condition.operator {
                ComparisonOperator::IsNull => self.push_sql(&format!("{} IS NULL", column)),
                ComparisonOperator::In => {
                    self.push_sql(&format!("{} IN (", column));
                    for (j, operand) in condition.operands.iter().enumerate() {
                        if j > 0 {
                            self.push_sql(", ");
                        }
                        self.push_param(to_engine(operand));
                    }
                    self.push_sql(")");
                }
                operator => {
                    self.push_sql(&format!("{} {} ", column, comparison_op_to_sql(operator)));
                    // Binary operators carry exactly one operand by construction
                    for operand in &condition.operands {
                        self.push_param(to_engine(operand));
                    }
                }
            }
        }
    }

    fn order_and_range(&mut self, predicate: &Predicate) {
        for (i, order) in predicate.order_by().iter().enumerate() {
            self.push_sql(if i == 0 { " ORDER BY " } else { ", " });
            self.push_sql(&ident(&order.column));
            self.push_sql(match order.direction {
                OrderDirection::Asc => " ASC",
                OrderDirection::Desc => " DESC",
            });
        }
        // Limit and offset were validated non-negative by the builder, so
        // inlining the integers is injection-safe. OFFSET requires a LIMIT
        // in SQLite; -1 means "no limit".
        match (predicate.limit_value(), predicate.offset_value()) {
            (Some(limit), Some(offset)) => self.push_sql(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => self.push_sql(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => self.push_sql(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }
    }
}

fn comparison_op_to_sql(op: ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Equal => "=",
        ComparisonOperator::NotEqual => "<>",
        ComparisonOperator::GreaterThan => ">",
        ComparisonOperator::GreaterThanOrEqual => ">=",
        ComparisonOperator::LessThan => "<",
        ComparisonOperator::LessThanOrEqual => "<=",
        ComparisonOperator::Like => "LIKE",
        // IN and IS NULL are rendered structurally in where_clause
        ComparisonOperator::In => "IN",
        ComparisonOperator::IsNull => "IS NULL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Value;

    #[test]
    fn select_with_conditions() {
        let predicate = Predicate::new("users").equal_to("name", "alice").greater_than("age", 21i64);
        let (sql, params) = SqlBuilder::select(&predicate, &["id", "name"]).unwrap();
        assert_eq!(sql, r#"SELECT "id", "name" FROM "users" WHERE "name" = ? AND "age" > ?"#);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn select_all_columns_without_conditions() {
        let predicate = Predicate::new("users");
        let (sql, params) = SqlBuilder::select(&predicate, &[]).unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users""#);
        assert!(params.is_empty());
    }

    #[test]
    fn select_with_order_limit_offset() {
        let predicate = Predicate::new("users").order_by_desc("age").order_by_asc("name").limit(10).offset(5);
        let (sql, _) = SqlBuilder::select(&predicate, &[]).unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users" ORDER BY "age" DESC, "name" ASC LIMIT 10 OFFSET 5"#);
    }

    #[test]
    fn offset_without_limit() {
        let predicate = Predicate::new("users").offset(3);
        let (sql, _) = SqlBuilder::select(&predicate, &[]).unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users" LIMIT -1 OFFSET 3"#);
    }

    #[test]
    fn in_clause_binds_each_operand() {
        let predicate = Predicate::new("users").is_in("id", vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        let (sql, params) = SqlBuilder::select(&predicate, &[]).unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users" WHERE "id" IN (?, ?, ?)"#);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn is_null_renders_without_params() {
        let predicate = Predicate::new("users").is_null("email");
        let (sql, params) = SqlBuilder::select(&predicate, &[]).unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users" WHERE "email" IS NULL"#);
        assert!(params.is_empty());
    }

    #[test]
    fn update_binds_set_before_where() {
        let predicate = Predicate::new("users").equal_to("id", 7i64);
        let columns = vec!["name".to_string(), "age".to_string()];
        let values = vec![rusqlite::types::Value::Text("bob".into()), rusqlite::types::Value::Integer(30)];
        let (sql, params) = SqlBuilder::update(&predicate, &columns, values).unwrap();
        assert_eq!(sql, r#"UPDATE "users" SET "name" = ?, "age" = ? WHERE "id" = ?"#);
        assert_eq!(params.len(), 3);
        assert_eq!(params[2], rusqlite::types::Value::Integer(7));
    }

    #[test]
    fn delete_with_condition() {
        let predicate = Predicate::new("users").like("name", "a%");
        let (sql, params) = SqlBuilder::delete(&predicate).unwrap();
        assert_eq!(sql, r#"DELETE FROM "users" WHERE "name" LIKE ?"#);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn insert_statement() {
        let columns = vec!["name".to_string(), "age".to_string()];
        let values = vec![rusqlite::types::Value::Text("carol".into()), rusqlite::types::Value::Null];
        let (sql, params) = SqlBuilder::insert("users", &columns, values);
        assert_eq!(sql, r#"INSERT INTO "users" ("name", "age") VALUES (?, ?)"#);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn identifiers_are_escaped() {
        let predicate = Predicate::new(r#"us"ers"#).equal_to(r#"na"me"#, 1i64);
        let (sql, _) = SqlBuilder::select(&predicate, &[]).unwrap();
        assert_eq!(sql, r#"SELECT * FROM "us""ers" WHERE "na""me" = ?"#);
    }

    #[test]
    fn poisoned_predicate_fails_at_build() {
        let predicate = Predicate::new("users").limit(-1);
        assert!(SqlBuilder::select(&predicate, &[]).is_err());
    }
}
