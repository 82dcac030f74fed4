//! Database initialization
//!
//! Opens (or creates) the SQLite store and ensures the `downloads` table
//! exists. Failure here is fatal for a run: callers propagate the error
//! and abort before any network work starts.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Name of the single table written by the ingest pipeline
pub const DOWNLOADS_TABLE: &str = "downloads";

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // WAL allows concurrent readers alongside the single writer
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_downloads_table(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the schema applied
///
/// Every SQLite `:memory:` connection is its own database, so the pool is
/// pinned to exactly one long-lived connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_downloads_table(&pool).await?;

    Ok(pool)
}

/// Create the downloads table (idempotent)
///
/// One row per package and calendar day. The unique key is the
/// decomposed day, which is what the upsert conflict target names.
pub async fn create_downloads_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS downloads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            count INTEGER NOT NULL,
            date DATETIME NOT NULL,
            last_updated_at DATETIME NOT NULL,

            date_year INTEGER NOT NULL,
            date_month INTEGER NOT NULL,
            date_day INTEGER NOT NULL,
            date_day_of_week INTEGER NOT NULL,

            UNIQUE(name, date_year, date_month, date_day)
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database tables initialized ({})", DOWNLOADS_TABLE);

    Ok(())
}
