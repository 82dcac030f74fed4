//! Bootstrap configuration loading and path resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`NPMDL_DATABASE`, `NPMDL_CONFIG`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error: defaults are used and a warning is
//! logged. A TOML file that exists but cannot be parsed is fatal.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "NPMDL_DATABASE";

/// Environment variable overriding the TOML config location
pub const CONFIG_ENV_VAR: &str = "NPMDL_CONFIG";

pub const DEFAULT_DATABASE_PATH: &str = "./storage.sqlite3";
pub const DEFAULT_DOWNLOADS_API_ROOT: &str = "https://api.npmjs.org";
pub const DEFAULT_REGISTRY_API_ROOT: &str = "https://registry.npmjs.org";
pub const DEFAULT_PERIOD: &str = "last-day";
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 100;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;
/// SQLite has a single writer; one in-flight upsert avoids lock contention
pub const DEFAULT_INSERT_CONCURRENCY: usize = 1;

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional in the file; absent fields take the built-in
/// defaults above.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    pub database_path: Option<PathBuf>,

    /// Downloads period token passed verbatim to the API
    pub period: String,

    /// Records per upsert statement
    pub insert_batch_size: usize,

    /// Maximum in-flight HTTP requests per stage
    pub fetch_concurrency: usize,

    /// Maximum in-flight upsert statements
    pub insert_concurrency: usize,

    pub downloads_api_root: String,
    pub registry_api_root: String,

    /// Exit with a non-zero status when any failure was recorded
    pub fail_on_errors: bool,

    /// Registry search ranking weights
    pub search: SearchWeightsConfig,

    /// Logging configuration (optional)
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            period: DEFAULT_PERIOD.to_string(),
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            insert_concurrency: DEFAULT_INSERT_CONCURRENCY,
            downloads_api_root: DEFAULT_DOWNLOADS_API_ROOT.to_string(),
            registry_api_root: DEFAULT_REGISTRY_API_ROOT.to_string(),
            fail_on_errors: false,
            search: SearchWeightsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Search ranking weights, each typically within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchWeightsConfig {
    pub quality: f64,
    pub popularity: f64,
    pub maintenance: f64,
}

impl Default for SearchWeightsConfig {
    fn default() -> Self {
        // Registry website defaults
        Self {
            quality: 0.65,
            popularity: 0.98,
            maintenance: 0.5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Check numeric settings that would otherwise violate pipeline contracts
    pub fn validate(&self) -> Result<()> {
        if self.insert_batch_size == 0 {
            return Err(Error::Config("insert_batch_size must be at least 1".to_string()));
        }
        if self.fetch_concurrency == 0 {
            return Err(Error::Config("fetch_concurrency must be at least 1".to_string()));
        }
        if self.insert_concurrency == 0 {
            return Err(Error::Config("insert_concurrency must be at least 1".to_string()));
        }

        let weights = [
            ("quality", self.search.quality),
            ("popularity", self.search.popularity),
            ("maintenance", self.search.maintenance),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(Error::Config(format!("search.{} must be a finite number", name)));
            }
            if !(0.0..=1.0).contains(&value) {
                warn!("search.{} = {} is outside the usual [0, 1] range", name, value);
            }
        }

        Ok(())
    }
}

/// Default location of the TOML config file for the platform
///
/// `~/.config/npmdl/config.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("npmdl").join("config.toml"))
}

/// Load TOML config
///
/// `explicit` is the path given on the command line or through
/// [`CONFIG_ENV_VAR`]; when `None` the platform default location is used.
/// A missing file yields defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using built-in defaults");
            return Ok(TomlConfig::default());
        }
    };

    if !path.exists() {
        if explicit.is_some() {
            warn!("Config file {} not found, using built-in defaults", path.display());
        }
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse TOML config text
pub fn parse_toml_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Database path resolution:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (`./storage.sqlite3`)
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.database_path {
        return path.clone();
    }

    PathBuf::from(DEFAULT_DATABASE_PATH)
}
