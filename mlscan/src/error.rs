//! Scan error types
//!
//! Per-track problems never surface here; they are logged and counted.
//! A `ScanError` means a whole branch (or the whole scan) could not go on.

use crate::services::path_parser::FormatError;
use crate::services::tag_reader::TagError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Library root does not exist
    #[error("Root path not found: {0}")]
    RootNotFound(PathBuf),

    /// Library root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Album folder does not follow the naming grammar
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Audio file could not be read
    #[error(transparent)]
    Tag(#[from] TagError),

    /// Directory enumeration failed
    #[error("Failed to list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Repository get-or-create failed
    #[error("Repository error: {0}")]
    Repository(#[from] mlscan_common::Error),

    /// Scan was cancelled by the operator
    #[error("Scan cancelled")]
    Cancelled,

    /// A worker task panicked or was aborted
    #[error("Worker task failed: {0}")]
    TaskFailed(String),

    /// Invalid scan settings
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
