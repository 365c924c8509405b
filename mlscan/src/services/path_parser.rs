//! Directory and file name grammars
//!
//! Library layout is `<root>/<Artist>/<YYYY - Album>/<NN - Title>.<ext>`.
//! These parsers are pure: no filesystem access, only the path text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

static ALBUM_FOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<year>\d{4})\s*-\s*(?P<title>.+)$").expect("album folder regex is valid")
});

static TRACK_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<track>\d{2})\s*-\s*(?P<title>.+)$").expect("track file regex is valid")
});

/// Name does not follow the required grammar
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Album folder name '{0}' is not in the expected format '<YYYY> - <Album Title>'")]
    AlbumFolder(String),

    #[error("Track file name '{0}' is not in the expected format '<NN> - <Track Title>'")]
    TrackFile(String),
}

/// Artist name from an artist directory: its last path segment
///
/// Trailing separators are ignored. Paths with no usable last segment
/// (e.g. `/`) fall back to the whole path text.
pub fn parse_artist_name(artist_dir: &Path) -> String {
    match artist_dir.file_name() {
        Some(name) => name.to_string_lossy().trim().to_string(),
        None => artist_dir.to_string_lossy().trim().to_string(),
    }
}

/// `(year, title)` from a `YYYY - Title` album folder
pub fn parse_album_folder(album_dir: &Path) -> Result<(i32, String), FormatError> {
    let folder_name = last_segment(album_dir);

    let caps = ALBUM_FOLDER_RE
        .captures(&folder_name)
        .ok_or_else(|| FormatError::AlbumFolder(folder_name.clone()))?;

    let year = caps["year"]
        .parse::<i32>()
        .map_err(|_| FormatError::AlbumFolder(folder_name.clone()))?;
    let title = caps["title"].trim();
    if title.is_empty() {
        return Err(FormatError::AlbumFolder(folder_name));
    }

    Ok((year, title.to_string()))
}

/// `(track_number, title)` from a `NN - Title.ext` file
pub fn parse_track_file(track_file: &Path) -> Result<(u32, String), FormatError> {
    let stem = track_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let caps = TRACK_FILE_RE
        .captures(&stem)
        .ok_or_else(|| FormatError::TrackFile(stem.clone()))?;

    let track_number = caps["track"]
        .parse::<u32>()
        .map_err(|_| FormatError::TrackFile(stem.clone()))?;
    let title = caps["title"].trim();
    if title.is_empty() {
        return Err(FormatError::TrackFile(stem));
    }

    Ok((track_number, title.to_string()))
}

fn last_segment(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
