//! Library entities
//!
//! Each entity is created at most once per natural key and never updated
//! afterwards, so these records describe what gets written on first sight.

use chrono::NaiveDateTime;
use uuid::Uuid;

/// Persisted row ID assigned by the store
pub type EntityId = i64;

/// Artist resolved from an artist directory
///
/// Natural key: `name` (trimmed, case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
    pub discogs_artist_id: Option<i64>,
    pub musicbrainz_artist_id: Option<Uuid>,
    pub audiodb_artist_id: Option<i64>,
    pub biography: Option<String>,
}

impl Artist {
    /// Minimal artist known only by name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            discogs_artist_id: None,
            musicbrainz_artist_id: None,
            audiodb_artist_id: None,
            biography: None,
        }
    }
}

/// Album resolved from an album directory
///
/// Natural key: `(artist_id, year, title)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub title: String,
    pub year: Option<i32>,
    /// Catalog release ID, from the sidecar or a catalog lookup
    pub discogs_release_id: Option<i64>,
}

impl Album {
    pub fn new(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: title.into(),
            year,
            discogs_release_id: None,
        }
    }
}

/// Track resolved from an audio file
///
/// Natural key: `(album, artist, year, title, track_number)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Album title as resolved for this track (tag or enclosing folder)
    pub album: String,
    /// Artist name as resolved for this track (tag or enclosing folder)
    pub artist: String,
    pub year: i32,
    pub title: String,
    pub track_number: u32,
    pub duration_seconds: u32,
    pub tagged_at: Option<NaiveDateTime>,
    pub musicbrainz_track_id: Option<String>,
    pub musicbrainz_release_id: Option<String>,
    pub musicbrainz_artist_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_name_is_trimmed() {
        let artist = Artist::new("  The Beatles \n");
        assert_eq!(artist.name, "The Beatles");
        assert!(artist.biography.is_none());
    }

    #[test]
    fn test_artist_name_keeps_case() {
        assert_ne!(Artist::new("ABBA"), Artist::new("Abba"));
    }
}
