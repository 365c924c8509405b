//! Configuration loading and config file resolution
//!
//! Bootstrap configuration lives in a single TOML file. Every section and
//! every key is optional; anything left out falls back to a compiled default.
//!
//! Config file resolution priority:
//! 1. Explicit path (command-line `--config`)
//! 2. Environment variable (`MLSCAN_CONFIG`)
//! 3. Platform config dir: `<config_dir>/mlscan/config.toml`
//! 4. None (compiled defaults only)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MLSCAN_CONFIG";

/// Application directory name under the platform config/data dirs
const APP_DIR: &str = "mlscan";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Scan behaviour (root path, concurrency limits)
    #[serde(default)]
    pub settings: SettingsConfig,

    /// External catalog lookup service
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Persistent store
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[settings]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SettingsConfig {
    /// Library root used when none is given on the command line
    #[serde(default)]
    pub default_root_path: Option<PathBuf>,

    /// Album folders processed concurrently within one artist
    #[serde(default = "default_max_concurrent_albums")]
    pub max_concurrent_albums: usize,

    /// Track files processed concurrently within one album
    #[serde(default = "default_max_concurrent_tracks")]
    pub max_concurrent_tracks: usize,
}

/// `[catalog]` section (Discogs database search)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Disable to skip release lookups entirely
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// Personal access token (sent as `Authorization: Discogs token=...`)
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum spacing between requests, also the initial backoff delay
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Total attempts when the service answers "quota exceeded"
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[database]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to `<data_local_dir>/mlscan/library.db`
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Upper bound on retrying "database is locked" errors
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, console only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_max_concurrent_albums() -> usize {
    4
}

fn default_max_concurrent_tracks() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_catalog_base_url() -> String {
    "https://api.discogs.com".to_string()
}

fn default_user_agent() -> String {
    "MusicLibraryScanner/1.0".to_string()
}

fn default_min_interval_ms() -> u64 {
    1100 // ~1 request/second external quota, with headroom
}

fn default_max_attempts() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    8
}

fn default_lock_wait_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            default_root_path: None,
            max_concurrent_albums: default_max_concurrent_albums(),
            max_concurrent_tracks: default_max_concurrent_tracks(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_catalog_base_url(),
            token: None,
            user_agent: default_user_agent(),
            min_interval_ms: default_min_interval_ms(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: default_max_connections(),
            lock_wait_ms: default_lock_wait_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Compiled defaults for values that depend on the platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::audio_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Music")))
            .unwrap_or_else(|| PathBuf::from("./Music"));

        let database_path = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR).join("library.db"))
            .unwrap_or_else(|| PathBuf::from("./mlscan_data/library.db"));

        let config_path = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));

        Self {
            root_folder,
            database_path,
            config_path,
        }
    }
}

/// Find the config file to load, if any
///
/// A path given explicitly (CLI or env) is returned even when it does not
/// exist, so the caller can report it. The platform default is only
/// returned when the file is present.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    CompiledDefaults::for_current_platform()
        .config_path
        .filter(|p| p.exists())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Parse TOML text into a config
pub fn parse_toml_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Resolve and load the bootstrap config
///
/// No config file at all means compiled defaults. An explicitly named file
/// that is missing or malformed is an error.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading configuration from {}", path.display());
            load_toml_config(&path)
        }
        None => {
            debug!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}
