use std::str::FromStr;

use tracing::Level;

use strata_core::StoreError;
use strata_storage_sqlite::{StepContext, Store, StoreConfig};

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub fn create_users_table(ctx: &mut StepContext<'_>) -> Result<(), StoreError> {
    ctx.execute(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER,
            email TEXT UNIQUE
        )",
        &[],
    )?;
    Ok(())
}

/// In-memory store at version 1 with the users table in place.
#[allow(unused)]
pub async fn users_store() -> Store {
    Store::open(StoreConfig::in_memory(1).on_upgrade(0, create_users_table)).await.expect("open in-memory store")
}
