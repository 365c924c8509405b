//! Database access for mlscan
//!
//! SQLite store for the three library tables plus the `Repository`
//! contract the scanner talks to.

pub mod albums;
pub mod artists;
pub mod repository;
pub mod schema;
pub mod tracks;

pub use repository::{Repository, SqliteRepository};

use mlscan_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// Initialize database connection pool
///
/// Creates the file (and parent directory) when missing, enables WAL so
/// concurrent readers don't block the writer, and applies the schema.
pub async fn init_database_pool(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    tracing::debug!("Connecting to database: {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    schema::initialize_schema(&pool).await?;

    Ok(pool)
}

/// Row counts per library table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryCounts {
    pub artists: i64,
    pub albums: i64,
    pub tracks: i64,
}

pub async fn library_counts(pool: &SqlitePool) -> Result<LibraryCounts> {
    let artists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists")
        .fetch_one(pool)
        .await?;
    let albums: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums")
        .fetch_one(pool)
        .await?;
    let tracks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(pool)
        .await?;

    Ok(LibraryCounts {
        artists,
        albums,
        tracks,
    })
}
