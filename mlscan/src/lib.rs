//! mlscan library interface
//!
//! Scans an `<artist>/<YYYY - album>/<NN - track>` music library into a
//! SQLite store, enriching albums with catalog release IDs.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ScanError, ScanResult};
pub use crate::services::{ScanCoordinator, ScanSettings};

/// Version line shown by `--version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", ",
    env!("BUILD_PROFILE"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);
