//! Errors shared by the configuration and storage layers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "sqlx")]
    #[error("SQLite: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable config file or an out-of-range setting
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}
