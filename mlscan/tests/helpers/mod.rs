//! Test Helper Utilities
//!
//! Shared utilities for testing mlscan

#![allow(dead_code)]

pub mod audio_generator;
pub mod counting_repository;
pub mod db_utils;
pub mod fake_catalog;
pub mod log_capture;

pub use audio_generator::{generate_test_wav, AudioConfig, LibraryBuilder};
pub use counting_repository::CountingRepository;
pub use db_utils::{album_release_ids, create_test_repository};
pub use fake_catalog::{FakeCatalog, FakeResponse};
pub use log_capture::{capture_logs, LogCapture};
