//! Runtime configuration resolution for mlscan
//!
//! Each setting comes from the first source that provides it:
//! command line → environment → TOML file → compiled default.

use crate::services::ScanSettings;
use mlscan_common::config::{
    CatalogConfig, CompiledDefaults, DatabaseConfig, LoggingConfig, TomlConfig,
};
use mlscan_common::{Error, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

pub const ROOT_ENV_VAR: &str = "MLSCAN_ROOT";
pub const DATABASE_ENV_VAR: &str = "MLSCAN_DATABASE";
pub const TOKEN_ENV_VAR: &str = "MLSCAN_DISCOGS_TOKEN";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub no_catalog: bool,
    pub max_albums: Option<usize>,
    pub max_tracks: Option<usize>,
    pub quiet: bool,
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub database_path: PathBuf,
    pub database: DatabaseConfig,
    pub scan: ScanSettings,
    /// `None` when catalog lookups are disabled
    pub catalog: Option<CatalogConfig>,
    pub logging: LoggingConfig,
    pub quiet: bool,
}

/// Merge CLI, environment and TOML into a runtime configuration
pub fn resolve(toml: &TomlConfig, cli: &CliOverrides) -> Result<RuntimeConfig> {
    let defaults = CompiledDefaults::for_current_platform();

    let root = cli
        .root
        .clone()
        .or_else(|| env_path(ROOT_ENV_VAR))
        .or_else(|| toml.settings.default_root_path.clone())
        .unwrap_or(defaults.root_folder);

    let database_path = cli
        .database
        .clone()
        .or_else(|| env_path(DATABASE_ENV_VAR))
        .or_else(|| toml.database.path.clone())
        .unwrap_or(defaults.database_path);

    let scan = ScanSettings::new(
        cli.max_albums.unwrap_or(toml.settings.max_concurrent_albums),
        cli.max_tracks.unwrap_or(toml.settings.max_concurrent_tracks),
    )
    .map_err(|e| Error::Config(e.to_string()))?
    .with_quiet(cli.quiet);

    let catalog = if toml.catalog.enabled && !cli.no_catalog {
        Some(resolve_catalog(&toml.catalog))
    } else {
        debug!("Catalog lookups disabled");
        None
    };

    Ok(RuntimeConfig {
        root,
        database_path,
        database: toml.database.clone(),
        scan,
        catalog,
        logging: toml.logging.clone(),
        quiet: cli.quiet,
    })
}

/// Environment token wins over the TOML one
fn resolve_catalog(config: &CatalogConfig) -> CatalogConfig {
    let mut catalog = config.clone();

    let env_token = std::env::var(TOKEN_ENV_VAR)
        .ok()
        .filter(|t| !t.trim().is_empty());

    if env_token.is_some() && catalog.token.is_some() {
        warn!(
            "Catalog token found in both {} and config file, using environment",
            TOKEN_ENV_VAR
        );
    }
    if let Some(token) = env_token {
        catalog.token = Some(token);
    }

    if catalog.token.is_none() {
        warn!("No catalog token configured; release lookups will likely be rejected");
    }

    catalog
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}
