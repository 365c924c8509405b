//! Repository contract
//!
//! The scanner only ever asks for "select-or-insert, return ID". Every
//! implementation must be idempotent per natural key and safe to call from
//! many workers at once; the identity cache in front of it is the first line
//! of deduplication, not the only one.

use crate::models::{Album, Artist, EntityId, Track};
use crate::utils::retry_on_lock;
use async_trait::async_trait;
use mlscan_common::Result;
use sqlx::SqlitePool;

/// Get-or-create access to the library store
#[async_trait]
pub trait Repository: Send + Sync {
    /// Natural key: artist name
    async fn get_or_create_artist(&self, artist: &Artist) -> Result<EntityId>;

    /// Existing album ID for (artist_id, year, title), without creating
    async fn find_album(&self, artist_id: EntityId, album: &Album) -> Result<Option<EntityId>>;

    /// Natural key: (artist_id, year, title)
    async fn get_or_create_album(&self, artist_id: EntityId, album: &Album) -> Result<EntityId>;

    /// Natural key: (album, artist, year, title, track_number)
    async fn get_or_create_track(
        &self,
        album_id: EntityId,
        artist_id: EntityId,
        track: &Track,
    ) -> Result<EntityId>;
}

/// SQLite-backed repository
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
    lock_wait_ms: u64,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool, lock_wait_ms: u64) -> Self {
        Self { pool, lock_wait_ms }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn get_or_create_artist(&self, artist: &Artist) -> Result<EntityId> {
        retry_on_lock("artist get-or-create", self.lock_wait_ms, || {
            super::artists::get_or_create_artist(&self.pool, artist)
        })
        .await
    }

    async fn find_album(&self, artist_id: EntityId, album: &Album) -> Result<Option<EntityId>> {
        super::albums::find_album_id(&self.pool, artist_id, album.year, &album.title).await
    }

    async fn get_or_create_album(&self, artist_id: EntityId, album: &Album) -> Result<EntityId> {
        retry_on_lock("album get-or-create", self.lock_wait_ms, || {
            super::albums::get_or_create_album(&self.pool, artist_id, album)
        })
        .await
    }

    async fn get_or_create_track(
        &self,
        album_id: EntityId,
        artist_id: EntityId,
        track: &Track,
    ) -> Result<EntityId> {
        retry_on_lock("track get-or-create", self.lock_wait_ms, || {
            super::tracks::get_or_create_track(&self.pool, album_id, artist_id, track)
        })
        .await
    }
}
