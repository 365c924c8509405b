//! Library schema
//!
//! Unique indexes on the natural keys back up the in-process identity
//! cache: a racing duplicate insert hits `ON CONFLICT DO NOTHING` and the
//! caller re-selects the winner's row.

use mlscan_common::Result;
use sqlx::SqlitePool;

/// Create tables and indexes if they don't exist
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            discogs_artist_id INTEGER,
            musicbrainz_artist_id TEXT,
            audiodb_artist_id INTEGER,
            biography TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artist_id INTEGER NOT NULL REFERENCES artists(id),
            year INTEGER,
            title TEXT NOT NULL,
            discogs_release_id INTEGER,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // NULL years must still collide, so index the coalesced value
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_albums_natural_key
            ON albums (artist_id, IFNULL(year, -1), title)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            album_id INTEGER NOT NULL REFERENCES albums(id),
            artist_id INTEGER NOT NULL REFERENCES artists(id),
            album TEXT NOT NULL,
            artist TEXT NOT NULL,
            year INTEGER NOT NULL,
            title TEXT NOT NULL,
            track_number INTEGER NOT NULL,
            duration INTEGER NOT NULL,
            date_tagged TEXT,
            musicbrainz_track_id TEXT,
            musicbrainz_release_id TEXT,
            musicbrainz_artist_id TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (album, artist, year, title, track_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_album_id ON tracks (album_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (artists, albums, tracks)");

    Ok(())
}
