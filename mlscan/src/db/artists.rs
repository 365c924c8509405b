//! Artist database operations

use crate::models::{Artist, EntityId};
use mlscan_common::{Error, Result};
use sqlx::SqlitePool;

/// Look up an artist row by natural key
pub async fn find_artist_id(pool: &SqlitePool, name: &str) -> Result<Option<EntityId>> {
    let id = sqlx::query_scalar("SELECT id FROM artists WHERE name = ? LIMIT 1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Select-or-insert an artist, returning its ID
///
/// Enrichment fields are only written on insert; an existing row is
/// returned untouched.
pub async fn get_or_create_artist(pool: &SqlitePool, artist: &Artist) -> Result<EntityId> {
    if let Some(id) = find_artist_id(pool, &artist.name).await? {
        return Ok(id);
    }

    let inserted: Option<EntityId> = sqlx::query_scalar(
        r#"
        INSERT INTO artists (
            name, discogs_artist_id, musicbrainz_artist_id, audiodb_artist_id, biography
        ) VALUES (?, ?, ?, ?, ?)
        ON CONFLICT DO NOTHING
        RETURNING id
        "#,
    )
    .bind(&artist.name)
    .bind(artist.discogs_artist_id)
    .bind(artist.musicbrainz_artist_id.map(|id| id.to_string()))
    .bind(artist.audiodb_artist_id)
    .bind(&artist.biography)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(id) => {
            tracing::debug!(artist = %artist.name, id, "Inserted artist");
            Ok(id)
        }
        // Lost an insert race; the row exists now
        None => find_artist_id(pool, &artist.name).await?.ok_or_else(|| {
            Error::Internal(format!("Artist '{}' vanished after conflict", artist.name))
        }),
    }
}
