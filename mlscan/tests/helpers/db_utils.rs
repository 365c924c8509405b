//! Database Test Utilities

use anyhow::Result;
use mlscan::db::{init_database_pool, SqliteRepository};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// SQLite repository in a temp directory
///
/// Returns (TempDir, SqliteRepository) - TempDir must be kept alive for duration of test
pub async fn create_test_repository() -> Result<(TempDir, SqliteRepository)> {
    let temp_dir = TempDir::new()?;
    let pool = init_database_pool(&temp_dir.path().join("library.db"), 8).await?;
    Ok((temp_dir, SqliteRepository::new(pool, 5000)))
}

/// `(title, discogs_release_id)` for every album, ordered by title
pub async fn album_release_ids(pool: &SqlitePool) -> Result<Vec<(String, Option<i64>)>> {
    let rows = sqlx::query_as("SELECT title, discogs_release_id FROM albums ORDER BY title")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
