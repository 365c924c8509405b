//! Track database operations

use crate::models::{EntityId, Track};
use mlscan_common::{Error, Result};
use sqlx::SqlitePool;

pub async fn find_track_id(pool: &SqlitePool, track: &Track) -> Result<Option<EntityId>> {
    let id = sqlx::query_scalar(
        r#"
        SELECT id FROM tracks
        WHERE album = ? AND artist = ? AND year = ? AND title = ? AND track_number = ?
        LIMIT 1
        "#,
    )
    .bind(&track.album)
    .bind(&track.artist)
    .bind(track.year)
    .bind(&track.title)
    .bind(track.track_number)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Select-or-insert a track, returning its ID
pub async fn get_or_create_track(
    pool: &SqlitePool,
    album_id: EntityId,
    artist_id: EntityId,
    track: &Track,
) -> Result<EntityId> {
    if let Some(id) = find_track_id(pool, track).await? {
        return Ok(id);
    }

    let inserted: Option<EntityId> = sqlx::query_scalar(
        r#"
        INSERT INTO tracks (
            album_id, artist_id, album, artist, year, title, track_number, duration,
            date_tagged, musicbrainz_track_id, musicbrainz_release_id, musicbrainz_artist_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT DO NOTHING
        RETURNING id
        "#,
    )
    .bind(album_id)
    .bind(artist_id)
    .bind(&track.album)
    .bind(&track.artist)
    .bind(track.year)
    .bind(&track.title)
    .bind(track.track_number)
    .bind(track.duration_seconds)
    .bind(track.tagged_at)
    .bind(&track.musicbrainz_track_id)
    .bind(&track.musicbrainz_release_id)
    .bind(&track.musicbrainz_artist_id)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(id) => Ok(id),
        None => find_track_id(pool, track).await?.ok_or_else(|| {
            Error::Internal(format!("Track '{}' vanished after conflict", track.title))
        }),
    }
}
