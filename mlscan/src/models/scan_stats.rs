//! Scan statistics
//!
//! Counters are shared by every concurrent album/track worker, so they are
//! atomics. Start and end times are captured once; `finish` is idempotent so
//! the guaranteed-cleanup path can call it without checking who got there first.

use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Live counters for one scan
#[derive(Debug)]
pub struct ScanStats {
    artists: AtomicUsize,
    albums: AtomicUsize,
    tracks: AtomicUsize,
    failed_tracks: AtomicUsize,
    started_at: DateTime<Local>,
    timer: Instant,
    finished: Mutex<Option<(DateTime<Local>, Duration)>>,
}

/// Point-in-time copy of the counters, used for reporting
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub artist_count: usize,
    pub album_count: usize,
    pub track_count: usize,
    pub failed_track_count: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl ScanStats {
    /// Start the clock
    pub fn start() -> Self {
        Self {
            artists: AtomicUsize::new(0),
            albums: AtomicUsize::new(0),
            tracks: AtomicUsize::new(0),
            failed_tracks: AtomicUsize::new(0),
            started_at: Local::now(),
            timer: Instant::now(),
            finished: Mutex::new(None),
        }
    }

    pub fn increment_artist(&self) {
        self.artists.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_album(&self) {
        self.albums.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_track(&self) {
        self.tracks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed_track(&self) {
        self.failed_tracks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn track_count(&self) -> usize {
        self.tracks.load(Ordering::Relaxed)
    }

    /// Stop the clock; later calls keep the first end time
    pub fn finish(&self) {
        let mut finished = self
            .finished
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if finished.is_none() {
            *finished = Some((Local::now(), self.timer.elapsed()));
        }
    }

    /// Snapshot counters; an unfinished scan reports elapsed time so far
    pub fn summary(&self) -> ScanSummary {
        let finished = *self
            .finished
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let (finished_at, elapsed) =
            finished.unwrap_or_else(|| (Local::now(), self.timer.elapsed()));

        ScanSummary {
            artist_count: self.artists.load(Ordering::Relaxed),
            album_count: self.albums.load(Ordering::Relaxed),
            track_count: self.tracks.load(Ordering::Relaxed),
            failed_track_count: self.failed_tracks.load(Ordering::Relaxed),
            started_at: self.started_at,
            finished_at,
            elapsed,
        }
    }
}

impl ScanSummary {
    pub fn tracks_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.track_count as f64 / secs
        } else {
            0.0
        }
    }

    pub fn tracks_per_minute(&self) -> f64 {
        self.tracks_per_second() * 60.0
    }

    /// `1h 2m 3s`, `2m 3s` or `3s`
    pub fn duration_display(&self) -> String {
        format_duration(self.elapsed)
    }
}

pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours >= 1 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes >= 1 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
