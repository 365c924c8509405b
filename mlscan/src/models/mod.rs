//! Data models for mlscan
//!
//! - Library entities resolved from the directory tree (artist, album, track)
//! - Scan statistics accumulated by concurrent workers
//! - End-of-scan report rendering

pub mod library;
pub mod scan_report;
pub mod scan_stats;

pub use library::{Album, Artist, EntityId, Track};
pub use scan_report::{Layout, ScanReport};
pub use scan_stats::{ScanStats, ScanSummary};
