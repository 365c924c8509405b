//! Library tree enumeration
//!
//! Each level of the tree is listed one directory at a time (depth 1 only);
//! the coordinator decides how to fan out over the entries. Results are
//! sorted so scans visit the tree in a stable order. An entry that cannot be
//! resolved (a dangling symlink, say) is skipped with a warning; failing to
//! read `dir` itself is an error.

use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Extensions (lowercase) treated as audio tracks
pub const AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "m4a", "ogg", "opus", "wav"];

/// Immediate subdirectories of `dir`
pub fn list_subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    list_children(dir, |entry| entry.file_type().is_dir())
}

/// Immediate audio files of `dir`
pub fn list_audio_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    list_children(dir, |entry| {
        entry.file_type().is_file() && is_audio_file(entry.path())
    })
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn list_children(dir: &Path, keep: impl Fn(&DirEntry) -> bool) -> io::Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    let mut paths = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.path().is_some_and(|p| p != dir) => {
                warn!(
                    path = %err.path().unwrap_or(dir).display(),
                    error = %err,
                    "Skipping unreadable directory entry"
                );
                continue;
            }
            Err(err) => return Err(io::Error::from(err)),
        };
        if !is_hidden(&entry) && keep(&entry) {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_sorted_subdirectories_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("Zappa")).unwrap();
        fs::create_dir(root.join("ABBA")).unwrap();
        fs::create_dir(root.join(".trash")).unwrap();
        fs::create_dir_all(root.join("ABBA/1976 - Arrival")).unwrap();
        fs::write(root.join("notes.txt"), "x").unwrap();

        let dirs = list_subdirectories(root).unwrap();
        assert_eq!(dirs, vec![root.join("ABBA"), root.join("Zappa")]);
    }

    #[test]
    fn test_hidden_root_still_lists_children() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join(".library");
        fs::create_dir_all(root.join("Nico")).unwrap();

        assert_eq!(list_subdirectories(&root).unwrap(), vec![root.join("Nico")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let album = temp_dir.path();
        fs::write(album.join("01 - Heroin.wav"), b"x").unwrap();
        std::os::unix::fs::symlink(album.join("nowhere"), album.join("cover.jpg")).unwrap();
        std::os::unix::fs::symlink(album.join("gone.flac"), album.join("02 - Gone.flac")).unwrap();

        assert_eq!(
            list_audio_files(album).unwrap(),
            vec![album.join("01 - Heroin.wav")]
        );
        assert!(list_subdirectories(album).unwrap().is_empty());
    }

    #[test]
    fn test_lists_audio_files_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("02 - B.FLAC"), "").unwrap();
        fs::write(root.join("01 - A.flac"), "").unwrap();
        fs::write(root.join("cover.jpg"), "").unwrap();
        fs::write(root.join("album.nfo"), "").unwrap();

        let files = list_audio_files(root).unwrap();
        assert_eq!(files, vec![root.join("01 - A.flac"), root.join("02 - B.FLAC")]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(list_subdirectories(Path::new("/nonexistent/mlscan/root")).is_err());
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("x.mp3")));
        assert!(is_audio_file(Path::new("x.Wav")));
        assert!(!is_audio_file(Path::new("x.cue")));
        assert!(!is_audio_file(Path::new("flac")));
    }
}
