//! Embedded audio tag reading
//!
//! Thin wrapper over lofty: probe the file, take the primary tag (or the
//! first tag of any kind), and keep only what the resolver consumes.

use chrono::{NaiveDate, NaiveDateTime};
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("Failed to read tags from {path}: {message}")]
    Read { path: String, message: String },
}

/// Tag values present in an audio file
///
/// Every field is optional; empty strings are normalized to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub year: Option<i32>,
    pub track_number: Option<u32>,
    pub duration_seconds: u32,
    pub tagged_at: Option<NaiveDateTime>,
    pub musicbrainz_track_id: Option<String>,
    pub musicbrainz_release_id: Option<String>,
    pub musicbrainz_artist_id: Option<String>,
}

/// Read tags and duration from an audio file
///
/// Blocking I/O; call from `spawn_blocking` in async contexts.
pub fn read_tags(path: &Path) -> Result<TrackTags, TagError> {
    let read_err = |message: String| TagError::Read {
        path: path.display().to_string(),
        message,
    };

    let tagged_file = Probe::open(path)
        .map_err(|e| read_err(e.to_string()))?
        .read()
        .map_err(|e| read_err(e.to_string()))?;

    let duration_seconds = tagged_file.properties().duration().as_secs() as u32;

    let mut tags = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        Some(tag) => from_tag(tag),
        None => TrackTags::default(),
    };
    tags.duration_seconds = duration_seconds;

    tracing::trace!(
        file = %path.display(),
        title = ?tags.title,
        duration_s = duration_seconds,
        "Read tags"
    );

    Ok(tags)
}

fn from_tag(tag: &Tag) -> TrackTags {
    TrackTags {
        title: non_empty(tag.title().as_deref()),
        album: non_empty(tag.album().as_deref()),
        album_artist: non_empty(tag.get_string(&ItemKey::AlbumArtist)),
        year: tag.year().and_then(|y| i32::try_from(y).ok()),
        track_number: tag.track(),
        duration_seconds: 0,
        tagged_at: tag
            .get_string(&ItemKey::TaggingTime)
            .and_then(parse_tagging_time),
        musicbrainz_track_id: non_empty(tag.get_string(&ItemKey::MusicBrainzRecordingId)),
        musicbrainz_release_id: non_empty(tag.get_string(&ItemKey::MusicBrainzReleaseId)),
        musicbrainz_artist_id: non_empty(tag.get_string(&ItemKey::MusicBrainzArtistId)),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Tagging timestamps come in several shapes depending on the tagger
pub fn parse_tagging_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
