//! Metadata resolution
//!
//! Every resolved field comes from an ordered list of candidate sources.
//! The first source holding a value wins; if none does, the field's default
//! is used. Keeping the order in one place per field makes the precedence
//! easy to audit:
//!
//! | Entity | Field         | Order                                       |
//! |--------|---------------|---------------------------------------------|
//! | Artist | name          | sidecar, directory name                     |
//! | Album  | title / year  | sidecar, folder name                        |
//! | Track  | title / number| tag, file name                              |
//! | Track  | album / artist| tag, enclosing album / artist               |
//! | Track  | year          | tag (only when > 0), enclosing album, 0     |

use crate::models::{Album, Artist, Track};
use crate::services::path_parser::{self, FormatError};
use crate::services::sidecar::{self, AlbumSidecar, ArtistSidecar};
use crate::services::tag_reader::TrackTags;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Sidecar,
    Tag,
    PathName,
    Enclosing,
    Default,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provenance::Sidecar => "sidecar",
            Provenance::Tag => "tag",
            Provenance::PathName => "path",
            Provenance::Enclosing => "enclosing",
            Provenance::Default => "default",
        };
        f.write_str(s)
    }
}

/// A value together with the source that supplied it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Provenance,
}

/// Pick the first present candidate, else the default
pub fn first_present<T>(
    candidates: impl IntoIterator<Item = (Provenance, Option<T>)>,
    default: T,
) -> Resolved<T> {
    candidates
        .into_iter()
        .find_map(|(source, value)| value.map(|value| Resolved { value, source }))
        .unwrap_or(Resolved {
            value: default,
            source: Provenance::Default,
        })
}

/// Values resolved for an album directory that its tracks inherit
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumContext {
    pub artist_name: String,
    pub album_title: String,
    pub year: Option<i32>,
}

/// Resolve an artist directory
///
/// A missing sidecar is normal; an unreadable one is logged and ignored.
pub fn resolve_artist(artist_dir: &Path) -> Artist {
    let sidecar = match sidecar::read_artist_sidecar(artist_dir) {
        Ok(sidecar) => sidecar,
        Err(e) => {
            warn!(dir = %artist_dir.display(), error = %e, "Artist sidecar unusable, using directory name");
            None
        }
    };
    build_artist(artist_dir, sidecar.unwrap_or_default())
}

fn build_artist(artist_dir: &Path, sidecar: ArtistSidecar) -> Artist {
    let name = first_present(
        [
            (Provenance::Sidecar, sidecar.name),
            (
                Provenance::PathName,
                Some(path_parser::parse_artist_name(artist_dir)),
            ),
        ],
        String::new(),
    );
    debug!(artist = %name.value, source = %name.source, "Resolved artist");

    let mut artist = Artist::new(name.value);
    artist.biography = sidecar.biography;
    artist.discogs_artist_id = sidecar.discogs_artist_id;
    artist.musicbrainz_artist_id = sidecar.musicbrainz_artist_id;
    artist.audiodb_artist_id = sidecar.audiodb_artist_id;
    artist
}

/// Resolve an album directory
///
/// The folder name must follow the `YYYY - Title` grammar even when a
/// sidecar supplies both fields; a nonconforming folder is a structural
/// defect of that branch.
pub fn resolve_album(album_dir: &Path) -> Result<Album, FormatError> {
    let parsed = path_parser::parse_album_folder(album_dir)?;

    let sidecar = match sidecar::read_album_sidecar(album_dir) {
        Ok(sidecar) => sidecar,
        Err(e) => {
            warn!(dir = %album_dir.display(), error = %e, "Album sidecar unusable, using folder name");
            None
        }
    };

    Ok(build_album(parsed, sidecar.unwrap_or_default()))
}

fn build_album((parsed_year, parsed_title): (i32, String), sidecar: AlbumSidecar) -> Album {
    let title = first_present(
        [
            (Provenance::Sidecar, sidecar.title),
            (Provenance::PathName, Some(parsed_title)),
        ],
        String::new(),
    );
    let year = first_present(
        [
            (Provenance::Sidecar, sidecar.year),
            (Provenance::PathName, Some(parsed_year)),
        ],
        0,
    );
    debug!(
        album = %title.value,
        title_source = %title.source,
        year = year.value,
        year_source = %year.source,
        "Resolved album"
    );

    let mut album = Album::new(title.value, Some(year.value));
    album.discogs_release_id = sidecar.discogs_release_id;
    album
}

/// Resolve a track from its file name and tags
///
/// The file name must follow the `NN - Title` grammar; tag values then
/// override what it supplied.
pub fn resolve_track(
    track_file: &Path,
    tags: &TrackTags,
    context: &AlbumContext,
) -> Result<Track, FormatError> {
    let (parsed_number, parsed_title) = path_parser::parse_track_file(track_file)?;

    let title = first_present(
        [
            (Provenance::Tag, tags.title.clone()),
            (Provenance::PathName, Some(parsed_title)),
        ],
        String::new(),
    );
    let track_number = first_present(
        [
            (Provenance::Tag, tags.track_number.filter(|n| *n > 0)),
            (Provenance::PathName, Some(parsed_number)),
        ],
        0,
    );
    let album = first_present(
        [
            (Provenance::Tag, tags.album.clone()),
            (Provenance::Enclosing, Some(context.album_title.clone())),
        ],
        String::new(),
    );
    let artist = first_present(
        [
            (Provenance::Tag, tags.album_artist.clone()),
            (Provenance::Enclosing, Some(context.artist_name.clone())),
        ],
        String::new(),
    );
    let year = first_present(
        [
            (Provenance::Tag, tags.year.filter(|y| *y > 0)),
            (Provenance::Enclosing, context.year),
        ],
        0,
    );

    debug!(
        file = %track_file.display(),
        title_source = %title.source,
        number_source = %track_number.source,
        year_source = %year.source,
        "Resolved track"
    );

    Ok(Track {
        album: album.value,
        artist: artist.value,
        year: year.value,
        title: title.value,
        track_number: track_number.value,
        duration_seconds: tags.duration_seconds,
        tagged_at: tags.tagged_at,
        musicbrainz_track_id: tags.musicbrainz_track_id.clone(),
        musicbrainz_release_id: tags.musicbrainz_release_id.clone(),
        musicbrainz_artist_id: tags.musicbrainz_artist_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn context() -> AlbumContext {
        AlbumContext {
            artist_name: "The Beatles".to_string(),
            album_title: "Abbey Road".to_string(),
            year: Some(1969),
        }
    }

    #[test]
    fn test_first_present_order() {
        let r = first_present([(Provenance::Tag, None), (Provenance::PathName, Some(2))], 0);
        assert_eq!(r, Resolved { value: 2, source: Provenance::PathName });

        let r: Resolved<i32> = first_present([(Provenance::Tag, None)], 7);
        assert_eq!(r.source, Provenance::Default);
        assert_eq!(r.value, 7);
    }

    #[test]
    fn test_tag_title_wins_over_file_name() {
        let tags = TrackTags {
            title: Some("Other Title".to_string()),
            ..Default::default()
        };
        let track = resolve_track(&PathBuf::from("03 - Title.flac"), &tags, &context()).unwrap();
        assert_eq!(track.title, "Other Title");
        assert_eq!(track.track_number, 3);
    }

    #[test]
    fn test_file_name_title_without_tag() {
        let track = resolve_track(
            &PathBuf::from("03 - Title.flac"),
            &TrackTags::default(),
            &context(),
        )
        .unwrap();
        assert_eq!(track.title, "Title");
        assert_eq!(track.album, "Abbey Road");
        assert_eq!(track.artist, "The Beatles");
        assert_eq!(track.year, 1969);
    }

    #[test]
    fn test_tag_year_zero_falls_back_to_album() {
        let tags = TrackTags {
            year: Some(0),
            track_number: Some(0),
            ..Default::default()
        };
        let track = resolve_track(&PathBuf::from("07 - Song.flac"), &tags, &context()).unwrap();
        assert_eq!(track.year, 1969);
        assert_eq!(track.track_number, 7);
    }

    #[test]
    fn test_tag_fields_override_enclosing_values() {
        let tags = TrackTags {
            album: Some("Abbey Road (Remaster)".to_string()),
            album_artist: Some("Beatles, The".to_string()),
            year: Some(2019),
            track_number: Some(12),
            duration_seconds: 185,
            ..Default::default()
        };
        let track = resolve_track(&PathBuf::from("01 - Song.flac"), &tags, &context()).unwrap();
        assert_eq!(track.album, "Abbey Road (Remaster)");
        assert_eq!(track.artist, "Beatles, The");
        assert_eq!(track.year, 2019);
        assert_eq!(track.track_number, 12);
        assert_eq!(track.duration_seconds, 185);
    }

    #[test]
    fn test_bad_track_name_is_format_error() {
        let result = resolve_track(&PathBuf::from("Song.flac"), &TrackTags::default(), &context());
        assert!(matches!(result, Err(FormatError::TrackFile(_))));
    }

    #[test]
    fn test_artist_without_sidecar_uses_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Nina Simone");
        std::fs::create_dir(&dir).unwrap();

        let artist = resolve_artist(&dir);
        assert_eq!(artist.name, "Nina Simone");
        assert!(artist.discogs_artist_id.is_none());
    }

    #[test]
    fn test_artist_sidecar_overrides_name() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("beatles");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(
            dir.join("artist.nfo"),
            "<artist><title>The Beatles</title><discogsartistid>82730</discogsartistid></artist>",
        )
        .unwrap();

        let artist = resolve_artist(&dir);
        assert_eq!(artist.name, "The Beatles");
        assert_eq!(artist.discogs_artist_id, Some(82730));
    }

    #[test]
    fn test_malformed_artist_sidecar_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Nina Simone");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("artist.nfo"), "<artist><title>").unwrap();

        assert_eq!(resolve_artist(&dir).name, "Nina Simone");
    }

    #[test]
    fn test_album_sidecar_supplies_release_id() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("1969 - Abbey Road");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(
            dir.join("album.nfo"),
            "<album><discogsreleaseid>24047</discogsreleaseid></album>",
        )
        .unwrap();

        let album = resolve_album(&dir).unwrap();
        assert_eq!(album.title, "Abbey Road");
        assert_eq!(album.year, Some(1969));
        assert_eq!(album.discogs_release_id, Some(24047));
    }

    #[test]
    fn test_album_folder_grammar_is_required() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Sgt Pepper");
        std::fs::create_dir(&dir).unwrap();
        assert!(resolve_album(&dir).is_err());
    }
}
