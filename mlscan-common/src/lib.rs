//! # mlscan Common Library
//!
//! Shared code for the music library scanner:
//! - Error and result types
//! - TOML bootstrap configuration and config file resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
