//! In-memory repository double
//!
//! Implements the same get-or-create semantics as the SQLite store and
//! counts how many times each operation actually created a row, and how
//! many times it was called at all.

use async_trait::async_trait;
use mlscan::db::Repository;
use mlscan::models::{Album, Artist, EntityId, Track};
use mlscan_common::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type AlbumNaturalKey = (EntityId, Option<i32>, String);
type TrackNaturalKey = (String, String, i32, String, u32);

#[derive(Default)]
struct Tables {
    next_id: EntityId,
    artists: HashMap<String, EntityId>,
    albums: HashMap<AlbumNaturalKey, (EntityId, Album)>,
    tracks: HashMap<TrackNaturalKey, EntityId>,
}

impl Tables {
    fn next(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct CountingRepository {
    tables: Mutex<Tables>,
    /// Simulated round-trip time, widens race windows
    delay: Duration,
    pub artist_calls: AtomicUsize,
    pub album_calls: AtomicUsize,
    pub track_calls: AtomicUsize,
}

impl CountingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn artist_calls(&self) -> usize {
        self.artist_calls.load(Ordering::SeqCst)
    }

    pub fn album_calls(&self) -> usize {
        self.album_calls.load(Ordering::SeqCst)
    }

    pub fn track_calls(&self) -> usize {
        self.track_calls.load(Ordering::SeqCst)
    }

    pub fn artist_count(&self) -> usize {
        self.tables.lock().unwrap().artists.len()
    }

    pub fn album_count(&self) -> usize {
        self.tables.lock().unwrap().albums.len()
    }

    pub fn track_count(&self) -> usize {
        self.tables.lock().unwrap().tracks.len()
    }

    pub fn albums(&self) -> Vec<Album> {
        self.tables
            .lock()
            .unwrap()
            .albums
            .values()
            .map(|(_, album)| album.clone())
            .collect()
    }

    pub fn track_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .tables
            .lock()
            .unwrap()
            .tracks
            .keys()
            .map(|key| key.3.clone())
            .collect();
        titles.sort();
        titles
    }

    async fn round_trip(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl Repository for CountingRepository {
    async fn get_or_create_artist(&self, artist: &Artist) -> Result<EntityId> {
        self.artist_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await;

        let mut tables = self.tables.lock().unwrap();
        if let Some(id) = tables.artists.get(&artist.name) {
            return Ok(*id);
        }
        let id = tables.next();
        tables.artists.insert(artist.name.clone(), id);
        Ok(id)
    }

    async fn find_album(&self, artist_id: EntityId, album: &Album) -> Result<Option<EntityId>> {
        self.round_trip().await;

        let key = (artist_id, album.year, album.title.clone());
        let tables = self.tables.lock().unwrap();
        Ok(tables.albums.get(&key).map(|(id, _)| *id))
    }

    async fn get_or_create_album(&self, artist_id: EntityId, album: &Album) -> Result<EntityId> {
        self.album_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await;

        let key = (artist_id, album.year, album.title.clone());
        let mut tables = self.tables.lock().unwrap();
        if let Some((id, _)) = tables.albums.get(&key) {
            return Ok(*id);
        }
        let id = tables.next();
        tables.albums.insert(key, (id, album.clone()));
        Ok(id)
    }

    async fn get_or_create_track(
        &self,
        _album_id: EntityId,
        _artist_id: EntityId,
        track: &Track,
    ) -> Result<EntityId> {
        self.track_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await;

        let key = (
            track.album.clone(),
            track.artist.clone(),
            track.year,
            track.title.clone(),
            track.track_number,
        );
        let mut tables = self.tables.lock().unwrap();
        if let Some(id) = tables.tracks.get(&key) {
            return Ok(*id);
        }
        let id = tables.next();
        tables.tracks.insert(key, id);
        Ok(id)
    }
}
