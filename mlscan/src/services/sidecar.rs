//! `artist.nfo` / `album.nfo` sidecar readers
//!
//! Sidecars are small XML documents dropped next to the media by library
//! managers. Only a handful of children are recognized; anything that fails
//! to parse as the expected type is dropped rather than rejected.

use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

pub const ARTIST_SIDECAR: &str = "artist.nfo";
pub const ALBUM_SIDECAR: &str = "album.nfo";

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML in {path}: {message}")]
    Xml { path: PathBuf, message: String },

    #[error("{path} has no <{expected}> root element")]
    MissingRoot { path: PathBuf, expected: &'static str },
}

/// Fields recognized in `artist.nfo`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistSidecar {
    pub name: Option<String>,
    pub biography: Option<String>,
    pub discogs_artist_id: Option<i64>,
    pub musicbrainz_artist_id: Option<Uuid>,
    pub audiodb_artist_id: Option<i64>,
}

/// Fields recognized in `album.nfo`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumSidecar {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub discogs_release_id: Option<i64>,
}

/// Read `<dir>/artist.nfo`; `Ok(None)` when there is no such file
pub fn read_artist_sidecar(artist_dir: &Path) -> Result<Option<ArtistSidecar>, SidecarError> {
    let path = artist_dir.join(ARTIST_SIDECAR);
    match read_if_present(&path)? {
        Some(text) => parse_artist_sidecar(&path, &text).map(Some),
        None => Ok(None),
    }
}

/// Read `<dir>/album.nfo`; `Ok(None)` when there is no such file
pub fn read_album_sidecar(album_dir: &Path) -> Result<Option<AlbumSidecar>, SidecarError> {
    let path = album_dir.join(ALBUM_SIDECAR);
    match read_if_present(&path)? {
        Some(text) => parse_album_sidecar(&path, &text).map(Some),
        None => Ok(None),
    }
}

pub fn parse_artist_sidecar(path: &Path, text: &str) -> Result<ArtistSidecar, SidecarError> {
    let doc = parse_document(path, text)?;
    let root = expect_root(path, &doc, "artist")?;

    Ok(ArtistSidecar {
        name: child_text(root, "title").or_else(|| child_text(root, "name")),
        biography: child_text(root, "biography"),
        discogs_artist_id: child_text(root, "discogsartistid").and_then(|v| v.parse().ok()),
        musicbrainz_artist_id: child_text(root, "musicbrainzartistid")
            .and_then(|v| Uuid::parse_str(&v).ok()),
        audiodb_artist_id: child_text(root, "audiodbartistid").and_then(|v| v.parse().ok()),
    })
}

pub fn parse_album_sidecar(path: &Path, text: &str) -> Result<AlbumSidecar, SidecarError> {
    let doc = parse_document(path, text)?;
    let root = expect_root(path, &doc, "album")?;

    Ok(AlbumSidecar {
        title: child_text(root, "title"),
        year: child_text(root, "year")
            .and_then(|v| v.parse().ok())
            .filter(|y: &i32| *y > 0),
        discogs_release_id: child_text(root, "discogsreleaseid").and_then(|v| v.parse().ok()),
    })
}

fn read_if_present(path: &Path) -> Result<Option<String>, SidecarError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SidecarError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_document<'a>(path: &Path, text: &'a str) -> Result<Document<'a>, SidecarError> {
    Document::parse(text).map_err(|e| SidecarError::Xml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn expect_root<'a, 'input>(
    path: &Path,
    doc: &'a Document<'input>,
    expected: &'static str,
) -> Result<Node<'a, 'input>, SidecarError> {
    let root = doc.root_element();
    if root.has_tag_name(expected) {
        Ok(root)
    } else {
        Err(SidecarError::MissingRoot {
            path: path.to_path_buf(),
            expected,
        })
    }
}

/// Trimmed text of the first child element with this name, empty = absent
fn child_text(node: Node, name: &str) -> Option<String> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
