//! Album database operations

use crate::models::{Album, EntityId};
use mlscan_common::{Error, Result};
use sqlx::SqlitePool;

/// Look up an album row by natural key; a missing year matches a NULL year
pub async fn find_album_id(
    pool: &SqlitePool,
    artist_id: EntityId,
    year: Option<i32>,
    title: &str,
) -> Result<Option<EntityId>> {
    let id = sqlx::query_scalar(
        "SELECT id FROM albums WHERE artist_id = ? AND year IS ? AND title = ? LIMIT 1",
    )
    .bind(artist_id)
    .bind(year)
    .bind(title)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Select-or-insert an album, returning its ID
pub async fn get_or_create_album(
    pool: &SqlitePool,
    artist_id: EntityId,
    album: &Album,
) -> Result<EntityId> {
    if let Some(id) = find_album_id(pool, artist_id, album.year, &album.title).await? {
        return Ok(id);
    }

    let inserted: Option<EntityId> = sqlx::query_scalar(
        r#"
        INSERT INTO albums (artist_id, year, title, discogs_release_id)
        VALUES (?, ?, ?, ?)
        ON CONFLICT DO NOTHING
        RETURNING id
        "#,
    )
    .bind(artist_id)
    .bind(album.year)
    .bind(&album.title)
    .bind(album.discogs_release_id)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(id) => {
            tracing::debug!(album = %album.title, artist_id, id, "Inserted album");
            Ok(id)
        }
        None => find_album_id(pool, artist_id, album.year, &album.title)
            .await?
            .ok_or_else(|| {
                Error::Internal(format!("Album '{}' vanished after conflict", album.title))
            }),
    }
}
