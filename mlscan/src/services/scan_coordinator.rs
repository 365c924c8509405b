//! Library scan coordinator
//!
//! Walks `<root>/<artist>/<album>/<track>`:
//! - artists one at a time
//! - albums of one artist through a `buffer_unordered(max_concurrent_albums)` stream
//! - tracks of one album through a `buffer_unordered(max_concurrent_tracks)` stream
//!
//! An artist's ID is resolved before any of its albums start, and an album's
//! ID before any of its tracks start. Nothing else is ordered.
//!
//! Track failures are logged and counted, never propagated. An album-level
//! failure lets sibling albums finish, then ends the scan with the first
//! error. The report is emitted on every exit path once the root has been
//! validated, including cancellation and panics.

use crate::db::Repository;
use crate::error::{ScanError, ScanResult};
use crate::models::{Album, EntityId, ScanReport, ScanStats, ScanSummary};
use crate::services::catalog_client::CatalogClient;
use crate::services::directory_walker;
use crate::services::identity_cache::{AlbumKey, ArtistKey, IdentityCache};
use crate::services::metadata_resolver::{self, AlbumContext};
use crate::services::tag_reader;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Concurrency limits and output mode for a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    max_concurrent_albums: usize,
    max_concurrent_tracks: usize,
    quiet: bool,
}

impl ScanSettings {
    /// Both limits must be at least 1
    pub fn new(max_concurrent_albums: usize, max_concurrent_tracks: usize) -> ScanResult<Self> {
        if max_concurrent_albums == 0 {
            return Err(ScanError::Config(
                "max_concurrent_albums must be at least 1".to_string(),
            ));
        }
        if max_concurrent_tracks == 0 {
            return Err(ScanError::Config(
                "max_concurrent_tracks must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_concurrent_albums,
            max_concurrent_tracks,
            quiet: false,
        })
    }

    /// Quiet: the report goes to the log only
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn max_concurrent_albums(&self) -> usize {
        self.max_concurrent_albums
    }

    pub fn max_concurrent_tracks(&self) -> usize {
        self.max_concurrent_tracks
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_concurrent_albums: 4,
            max_concurrent_tracks: 8,
            quiet: false,
        }
    }
}

/// Finalizes stats and emits the report when dropped
struct ReportGuard<'a> {
    stats: &'a ScanStats,
    quiet: bool,
}

impl Drop for ReportGuard<'_> {
    fn drop(&mut self) {
        self.stats.finish();
        ScanReport::new(self.stats.summary()).emit(self.quiet);
    }
}

pub struct ScanCoordinator {
    repository: Arc<dyn Repository>,
    catalog: Option<Arc<CatalogClient>>,
    settings: ScanSettings,
    artists: IdentityCache<ArtistKey>,
    albums: IdentityCache<AlbumKey>,
}

impl ScanCoordinator {
    /// `catalog: None` disables release lookups
    pub fn new(
        repository: Arc<dyn Repository>,
        catalog: Option<Arc<CatalogClient>>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            repository,
            catalog,
            settings,
            artists: IdentityCache::new(),
            albums: IdentityCache::new(),
        }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan the library under `root`
    ///
    /// A missing or non-directory root fails before any work starts and
    /// produces no report.
    pub async fn scan(&self, root: &Path, cancel: &CancellationToken) -> ScanResult<ScanSummary> {
        if !root.exists() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        info!(
            root = %root.display(),
            max_albums = self.settings.max_concurrent_albums,
            max_tracks = self.settings.max_concurrent_tracks,
            catalog = self.catalog.is_some(),
            "Starting library scan"
        );

        let stats = ScanStats::start();
        let guard = ReportGuard {
            stats: &stats,
            quiet: self.settings.quiet,
        };

        let result = self.scan_artists(root, &stats, cancel).await;
        drop(guard);

        let summary = stats.summary();
        let result = match result {
            Ok(()) if cancel.is_cancelled() => Err(ScanError::Cancelled),
            other => other,
        };
        match result {
            Err(ScanError::Cancelled) => {
                warn!(tracks = summary.track_count, "Library scan cancelled");
                Err(ScanError::Cancelled)
            }
            Ok(()) => {
                info!(
                    artists = summary.artist_count,
                    albums = summary.album_count,
                    tracks = summary.track_count,
                    failed_tracks = summary.failed_track_count,
                    elapsed = %summary.duration_display(),
                    "Library scan completed"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, tracks = summary.track_count, "Library scan aborted");
                Err(e)
            }
        }
    }

    async fn scan_artists(
        &self,
        root: &Path,
        stats: &ScanStats,
        cancel: &CancellationToken,
    ) -> ScanResult<()> {
        let artist_dirs =
            directory_walker::list_subdirectories(root).map_err(|e| ScanError::io(root, e))?;

        for artist_dir in artist_dirs {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            self.process_artist(&artist_dir, stats, cancel).await?;
            stats.increment_artist();
        }

        Ok(())
    }

    async fn process_artist(
        &self,
        artist_dir: &Path,
        stats: &ScanStats,
        cancel: &CancellationToken,
    ) -> ScanResult<()> {
        let artist = metadata_resolver::resolve_artist(artist_dir);
        let artist_id = self
            .artists
            .get_or_create(ArtistKey(artist.name.clone()), || {
                self.repository.get_or_create_artist(&artist)
            })
            .await?;

        info!(artist = %artist.name, artist_id, "Processing artist");

        let album_dirs = directory_walker::list_subdirectories(artist_dir)
            .map_err(|e| ScanError::io(artist_dir, e))?;
        let artist_name = artist.name.as_str();

        let results: Vec<ScanResult<()>> = stream::iter(album_dirs)
            .map(move |album_dir| async move {
                let result = self
                    .process_album(&album_dir, artist_id, artist_name, stats, cancel)
                    .await;
                if let Err(e) = &result {
                    if !matches!(e, ScanError::Cancelled) {
                        error!(
                            artist = artist_name,
                            album_dir = %album_dir.display(),
                            error = %e,
                            "Album processing failed"
                        );
                    }
                }
                result
            })
            .buffer_unordered(self.settings.max_concurrent_albums)
            .collect()
            .await;

        // Siblings have all finished; surface the first failure
        results.into_iter().collect()
    }

    async fn process_album(
        &self,
        album_dir: &Path,
        artist_id: EntityId,
        artist_name: &str,
        stats: &ScanStats,
        cancel: &CancellationToken,
    ) -> ScanResult<()> {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let album = metadata_resolver::resolve_album(album_dir)?;
        let key = AlbumKey {
            artist_id,
            year: album.year,
            title: album.title.clone(),
        };
        let album_id = self
            .albums
            .get_or_create(key, || self.create_album(artist_id, artist_name, &album, cancel))
            .await?;

        debug!(artist = artist_name, album = %album.title, album_id, "Processing album");

        let track_files = directory_walker::list_audio_files(album_dir)
            .map_err(|e| ScanError::io(album_dir, e))?;
        let context = AlbumContext {
            artist_name: artist_name.to_string(),
            album_title: album.title.clone(),
            year: album.year,
        };
        let context = &context;

        stream::iter(track_files)
            .map(move |track_file| async move {
                if cancel.is_cancelled() {
                    return;
                }
                match self
                    .process_track(&track_file, album_id, artist_id, context)
                    .await
                {
                    Ok(track_id) => {
                        stats.increment_track();
                        debug!(file = %track_file.display(), track_id, "Track stored");
                    }
                    Err(e) => {
                        stats.increment_failed_track();
                        error!(file = %track_file.display(), error = %e, "Track processing failed");
                    }
                }
            })
            .buffer_unordered(self.settings.max_concurrent_tracks)
            .collect::<Vec<()>>()
            .await;

        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        stats.increment_album();
        Ok(())
    }

    /// Existing row wins; the catalog is only asked about albums not yet stored
    async fn create_album(
        &self,
        artist_id: EntityId,
        artist_name: &str,
        album: &Album,
        cancel: &CancellationToken,
    ) -> mlscan_common::Result<EntityId> {
        if let Some(album_id) = self.repository.find_album(artist_id, album).await? {
            debug!(artist = artist_name, album = %album.title, album_id, "Album already stored");
            return Ok(album_id);
        }

        let mut album = album.clone();

        if album.discogs_release_id.is_none() {
            if let Some(catalog) = &self.catalog {
                album.discogs_release_id = catalog
                    .find_release_id(artist_name, &album.title, album.year, cancel)
                    .await;
            }
        }

        self.repository.get_or_create_album(artist_id, &album).await
    }

    async fn process_track(
        &self,
        track_file: &Path,
        album_id: EntityId,
        artist_id: EntityId,
        context: &AlbumContext,
    ) -> ScanResult<EntityId> {
        let path = track_file.to_path_buf();
        let tags = tokio::task::spawn_blocking(move || tag_reader::read_tags(&path))
            .await
            .map_err(|e| ScanError::TaskFailed(e.to_string()))??;

        let track = metadata_resolver::resolve_track(track_file, &tags, context)?;

        Ok(self
            .repository
            .get_or_create_track(album_id, artist_id, &track)
            .await?)
    }
}
