//! Store CRUD integration tests
//!
//! Covers the insert/update/delete/query surface, the affect-all guard for
//! unfiltered mutations, raw SQL entry points, and session lifecycle.

mod common;

use anyhow::Result;
use common::users_store;
use strata_core::{Predicate, Row, StoreError, Value};
use strata_storage_sqlite::{Store, StoreConfig};

#[tokio::test]
async fn insert_then_query_by_rowid_returns_the_row() -> Result<()> {
    let store = users_store().await;
    let id = store.insert("users", Row::new().set("name", "alice").set("age", 34i64)).await?;

    let mut cursor = store.query(&Predicate::new("users").equal_to("id", id), &[]).await?;
    assert_eq!(cursor.row_count()?, 1);
    assert!(cursor.go_to_next_row()?);
    assert_eq!(cursor.get_string_by_name("name")?, "alice");
    assert_eq!(cursor.get_long_by_name("age")?, 34);
    cursor.close();
    Ok(())
}

#[tokio::test]
async fn query_returns_copies_not_live_rows() -> Result<()> {
    let store = users_store().await;
    let id = store.insert("users", Row::new().set("name", "alice")).await?;

    let mut cursor = store.query(&Predicate::new("users").equal_to("id", id), &[]).await?;
    cursor.go_to_first_row()?;
    let row = cursor.get_row()?;
    cursor.close();
    drop(row); // mutating or dropping the copy has no effect on the file

    let mut check = store.query(&Predicate::new("users").equal_to("id", id), &[]).await?;
    assert_eq!(check.row_count()?, 1);
    check.close();
    Ok(())
}

#[tokio::test]
async fn update_with_predicate_affects_matching_rows_only() -> Result<()> {
    let store = users_store().await;
    store.insert("users", Row::new().set("name", "alice").set("age", 30i64)).await?;
    store.insert("users", Row::new().set("name", "bob").set("age", 40i64)).await?;

    let affected = store.update(Row::new().set("age", 41i64), &Predicate::new("users").equal_to("name", "bob")).await?;
    assert_eq!(affected, 1);

    let mut cursor = store.query(&Predicate::new("users").equal_to("name", "alice"), &["age"]).await?;
    cursor.go_to_first_row()?;
    assert_eq!(cursor.get_long(0)?, 30);
    cursor.close();
    Ok(())
}

#[tokio::test]
async fn unfiltered_mutation_requires_affect_all() -> Result<()> {
    let store = users_store().await;
    store.insert("users", Row::new().set("name", "alice")).await?;
    store.insert("users", Row::new().set("name", "bob")).await?;
    store.insert("users", Row::new().set("name", "carol")).await?;

    // Zero-condition predicate without the opt-in is rejected
    let err = store.delete(&Predicate::new("users")).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidPredicate(_)));
    let err = store.update(Row::new().set("age", 0i64), &Predicate::new("users")).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidPredicate(_)));

    // With the opt-in, every row is touched
    let affected = store.update(Row::new().set("age", 1i64), &Predicate::affect_all("users")).await?;
    assert_eq!(affected, 3);
    let affected = store.delete(&Predicate::affect_all("users")).await?;
    assert_eq!(affected, 3);

    let mut cursor = store.query(&Predicate::new("users"), &[]).await?;
    assert_eq!(cursor.row_count()?, 0);
    cursor.close();
    Ok(())
}

#[tokio::test]
async fn predicate_order_limit_offset() -> Result<()> {
    let store = users_store().await;
    for (name, age) in [("alice", 30i64), ("bob", 40), ("carol", 20), ("dave", 50)] {
        store.insert("users", Row::new().set("name", name).set("age", age)).await?;
    }

    let predicate = Predicate::new("users").greater_than("age", 20i64).order_by_desc("age").limit(2).offset(1);
    let mut cursor = store.query(&predicate, &["name"]).await?;
    assert_eq!(cursor.row_count()?, 2);
    cursor.go_to_first_row()?;
    assert_eq!(cursor.get_string(0)?, "bob");
    assert!(cursor.go_to_next_row()?);
    assert_eq!(cursor.get_string(0)?, "alice");
    cursor.close();
    Ok(())
}

#[tokio::test]
async fn in_and_like_and_null_conditions() -> Result<()> {
    let store = users_store().await;
    store.insert("users", Row::new().set("name", "alice").set("email", "a@x.io")).await?;
    store.insert("users", Row::new().set("name", "bob").set("email", Value::Null)).await?;
    store.insert("users", Row::new().set("name", "carol").set("email", "c@x.io")).await?;

    let mut cursor = store
        .query(&Predicate::new("users").is_in("name", vec![Value::from("alice"), Value::from("bob")]), &[])
        .await?;
    assert_eq!(cursor.row_count()?, 2);
    cursor.close();

    let mut cursor = store.query(&Predicate::new("users").like("email", "%@x.io"), &[]).await?;
    assert_eq!(cursor.row_count()?, 2);
    cursor.close();

    let mut cursor = store.query(&Predicate::new("users").is_null("email"), &["name"]).await?;
    cursor.go_to_first_row()?;
    assert_eq!(cursor.get_string(0)?, "bob");
    cursor.close();
    Ok(())
}

#[tokio::test]
async fn unknown_table_is_a_typed_error() -> Result<()> {
    let store = users_store().await;
    let err = store.insert("missing", Row::new().set("a", 1i64)).await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownTable(name) if name == "missing"));
    let err = store.query(&Predicate::new("missing"), &[]).await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownTable(_)));
    Ok(())
}

#[tokio::test]
async fn constraint_violation_is_a_typed_error() -> Result<()> {
    let store = users_store().await;
    store.insert("users", Row::new().set("name", "alice").set("email", "a@x.io")).await?;
    let err = store.insert("users", Row::new().set("name", "dupe").set("email", "a@x.io")).await.unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    // NOT NULL breach maps the same way
    let err = store.insert("users", Row::new().set("name", Value::Null)).await.unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    Ok(())
}

#[tokio::test]
async fn duplicate_column_in_row_rejected() -> Result<()> {
    let store = users_store().await;
    let err = store.insert("users", Row::new().set("name", "a").set("name", "b")).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateColumn(c) if c == "name"));
    Ok(())
}

#[tokio::test]
async fn raw_sql_entry_points() -> Result<()> {
    let store = users_store().await;
    let affected = store
        .execute_sql("INSERT INTO users (name, age) VALUES (?1, ?2)", &[Value::from("alice"), Value::from(34i64)])
        .await?;
    assert_eq!(affected, 1);

    let mut cursor = store.query_sql("SELECT name, age FROM users WHERE age > ?1", &[Value::from(30i64)]).await?;
    assert!(cursor.go_to_next_row()?);
    assert_eq!(cursor.get_string(0)?, "alice");
    cursor.close();
    Ok(())
}

#[tokio::test]
async fn closed_session_rejects_everything() -> Result<()> {
    let store = users_store().await;
    store.close().await?;
    assert!(matches!(store.insert("users", Row::new().set("name", "x")).await, Err(StoreError::SessionClosed)));
    assert!(matches!(store.query(&Predicate::new("users"), &[]).await, Err(StoreError::SessionClosed)));
    assert!(matches!(store.begin_transaction().await, Err(StoreError::SessionClosed)));
    assert!(matches!(store.close().await, Err(StoreError::SessionClosed)));
    Ok(())
}

#[tokio::test]
async fn close_releases_the_file_handle() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.db");

    let store = Store::open(StoreConfig::file(&path, 1).on_upgrade(0, common::create_users_table)).await?;
    store.insert("users", Row::new().set("name", "alice")).await?;

    // Check the process's open descriptors for the database file
    let holds_db = |path: &std::path::Path| -> bool {
        std::fs::read_dir("/proc/self/fd")
            .map(|entries| {
                entries
                    .flatten()
                    .any(|entry| std::fs::read_link(entry.path()).map(|target| target == path).unwrap_or(false))
            })
            .unwrap_or(false)
    };
    assert!(holds_db(&path));

    // Closing drops the connection; the Store value itself is still alive
    store.close().await?;
    assert!(!holds_db(&path));
    Ok(())
}

#[tokio::test]
async fn file_backed_store_persists_across_sessions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.db");

    let store = Store::open(StoreConfig::file(&path, 1).on_upgrade(0, common::create_users_table)).await?;
    let id = store.insert("users", Row::new().set("name", "alice")).await?;
    store.close().await?;

    let store = Store::open(StoreConfig::file(&path, 1).on_upgrade(0, common::create_users_table)).await?;
    let mut cursor = store.query(&Predicate::new("users").equal_to("id", id), &["name"]).await?;
    assert!(cursor.go_to_next_row()?);
    assert_eq!(cursor.get_string(0)?, "alice");
    cursor.close();
    store.close().await?;
    Ok(())
}

#[tokio::test]
async fn stores_over_different_files_are_independent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let a = Store::open(StoreConfig::file(dir.path().join("a.db"), 1).on_upgrade(0, common::create_users_table)).await?;
    let b = Store::open(StoreConfig::file(dir.path().join("b.db"), 1).on_upgrade(0, common::create_users_table)).await?;

    a.insert("users", Row::new().set("name", "only-in-a")).await?;
    let mut cursor = b.query(&Predicate::new("users"), &[]).await?;
    assert_eq!(cursor.row_count()?, 0);
    cursor.close();
    Ok(())
}
