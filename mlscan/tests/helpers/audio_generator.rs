//! On-disk library fixtures
//!
//! Tracks are short mono WAV files so lofty can read real durations.
//! Layout: `<root>/<Artist>/<YYYY - Album>/<NN - Title>.wav`.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 1.0,
            sample_rate: 8000,
            channels: 1,
        }
    }
}

/// Write a 16-bit PCM square wave of the configured length
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let format = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (config.duration_seconds * f64::from(config.sample_rate)).round() as u32;
    let half_period = (config.sample_rate / 880).max(1);

    let mut wav = hound::WavWriter::create(path, format)?;
    for frame in 0..frames {
        let level: i16 = if (frame / half_period) % 2 == 0 { 8000 } else { -8000 };
        for _ in 0..config.channels {
            wav.write_sample(level)?;
        }
    }
    wav.finalize()?;

    Ok(path.to_path_buf())
}

/// Temporary library on disk
pub struct LibraryBuilder {
    temp_dir: TempDir,
    audio: AudioConfig,
}

impl LibraryBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp library"),
            audio: AudioConfig::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn artist(&self, artist: &str) -> PathBuf {
        let dir = self.root().join(artist);
        std::fs::create_dir_all(&dir).expect("create artist dir");
        dir
    }

    pub fn album(&self, artist: &str, album_folder: &str) -> PathBuf {
        let dir = self.artist(artist).join(album_folder);
        std::fs::create_dir_all(&dir).expect("create album dir");
        dir
    }

    /// Add a WAV track file (`file_name` includes the extension)
    pub fn track(&self, artist: &str, album_folder: &str, file_name: &str) -> PathBuf {
        let path = self.album(artist, album_folder).join(file_name);
        generate_test_wav(&path, &self.audio).expect("write wav");
        path
    }

    /// Add an album with `count` tracks named `NN - Track N.wav`
    pub fn album_with_tracks(&self, artist: &str, album_folder: &str, count: usize) -> PathBuf {
        for n in 1..=count {
            self.track(artist, album_folder, &format!("{:02} - Track {}.wav", n, n));
        }
        self.album(artist, album_folder)
    }

    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }
}
