//! Media record persistence over SQLite.

mod media_repository;

pub use media_repository::MediaRepository;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use vodstore_core::AppError;

const SCHEMA: &str = include_str!("../schema.sql");

/// Connect to the record store, creating the database file and applying the
/// schema when needed. WAL keeps concurrent ingestion inserts from blocking
/// readers.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::raw_sql(SCHEMA).execute(&pool).await?;

    Ok(pool)
}

/// In-memory pool for tests. A single connection keeps the database alive
/// and visible to every query.
pub async fn connect_in_memory() -> Result<SqlitePool, AppError> {
    connect("sqlite::memory:", 1).await
}
