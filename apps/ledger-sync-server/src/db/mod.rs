//! Database module for SQLite persistence
//!
//! Holds per-user settings and the read side of the syncable collections.

mod collection;
mod schema;
mod settings;

pub use collection::{ResourceKind, SqliteCollection};
pub use schema::*;
pub use settings::{SettingsRepository, UserSettings, LANGUAGE_KEY, TIMEZONE_KEY};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::error::Result;

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    // Every connection to an in-memory database gets its own copy, so keep
    // exactly one alive for the lifetime of the pool
    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    // Run migrations
    initialize_schema(&pool).await?;

    Ok(pool)
}
