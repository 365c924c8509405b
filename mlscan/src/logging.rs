//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over the configured level. The console layer writes to
//! stderr and is left out in quiet mode; the optional file layer always
//! records, without ANSI colours.

use mlscan_common::config::LoggingConfig;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, else the configured level
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig, quiet: bool) -> anyhow::Result<()> {
    let console_layer = if quiet {
        None
    } else {
        Some(fmt::layer().with_writer(std::io::stderr).with_target(false))
    };

    let file_layer = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
