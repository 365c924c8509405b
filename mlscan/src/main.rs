//! mlscan - Music library scanner
//!
//! Walks a music library laid out as `<root>/<Artist>/<YYYY - Album>/<NN - Title>.<ext>`
//! and records artists, albums and tracks in a SQLite database. Album
//! release IDs are looked up in the Discogs catalog when enabled.

use anyhow::{Context, Result};
use clap::Parser;
use mlscan::config::{self, CliOverrides};
use mlscan::db::{self, SqliteRepository};
use mlscan::services::CatalogClient;
use mlscan::{ScanCoordinator, ScanError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Command-line arguments for mlscan
#[derive(Parser, Debug)]
#[command(name = "mlscan")]
#[command(about = "Scan a music library into a SQLite database")]
#[command(version = mlscan::LONG_VERSION)]
struct Args {
    /// Library root (falls back to MLSCAN_ROOT, then the configured default)
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,

    /// Log only: no console output, report goes to the log file
    #[arg(short = 'q', long = "log-only")]
    log_only: bool,

    /// Config file (falls back to MLSCAN_CONFIG, then the platform config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Skip catalog release lookups
    #[arg(long)]
    no_catalog: bool,

    /// Albums processed concurrently per artist
    #[arg(long, value_name = "N")]
    max_albums: Option<usize>,

    /// Tracks processed concurrently per album
    #[arg(long, value_name = "N")]
    max_tracks: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = mlscan_common::config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    let cli = CliOverrides {
        root: args.root,
        database: args.database,
        no_catalog: args.no_catalog,
        max_albums: args.max_albums,
        max_tracks: args.max_tracks,
        quiet: args.log_only,
    };
    let config = config::resolve(&toml_config, &cli).context("Invalid configuration")?;

    mlscan::logging::init(&config.logging, config.quiet)
        .context("Failed to initialize logging")?;

    info!("Starting mlscan {}", mlscan::LONG_VERSION);

    if !config.root.is_dir() {
        warn!(root = %config.root.display(), "Root path does not exist or is not a directory");
        return Ok(());
    }

    info!("Database: {}", config.database_path.display());

    let pool = db::init_database_pool(&config.database_path, config.database.max_connections)
        .await
        .context("Failed to open database")?;
    let repository = Arc::new(SqliteRepository::new(
        pool.clone(),
        config.database.lock_wait_ms,
    ));

    let catalog = match &config.catalog {
        Some(catalog_config) => Some(Arc::new(
            CatalogClient::new(catalog_config).context("Failed to create catalog client")?,
        )),
        None => None,
    };

    let coordinator = ScanCoordinator::new(repository, catalog, config.scan);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let result = coordinator.scan(&config.root, &cancel).await;

    let counts = db::library_counts(&pool).await;
    pool.close().await;

    match result {
        Ok(_) => {
            if let Ok(counts) = counts {
                info!(
                    artists = counts.artists,
                    albums = counts.albums,
                    tracks = counts.tracks,
                    "Library totals"
                );
            }
            Ok(())
        }
        Err(ScanError::Cancelled) => {
            warn!("Scan cancelled by operator");
            Ok(())
        }
        Err(e) => Err(e).context("Library scan failed"),
    }
}

/// Cancel the scan on Ctrl+C
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, cancelling scan");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "Failed to install Ctrl+C handler"),
    }
}
