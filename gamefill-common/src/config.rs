//! Configuration loading and dataset location resolution
//!
//! Every section has compiled defaults, so a partial TOML file (or none at
//! all) still yields a usable configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the dataset location
pub const DATASET_ENV_VAR: &str = "GAMEFILL_DATASET";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "GAMEFILL_CONFIG";

/// Compiled default dataset, relative to the working directory
pub const DEFAULT_DATASET: &str = "Games.db";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Dataset (SQLite file) to enrich
    pub dataset: Option<PathBuf>,
    pub table: TableConfig,
    pub lookup: LookupConfig,
    pub enrich: EnrichConfig,
    pub logging: LoggingConfig,
}

/// Table and column names inside the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub name: String,
    pub title_column: String,
    pub duration_column: String,
    pub year_column: String,
    pub score_column: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "games".to_string(),
            title_column: "Game Title".to_string(),
            duration_column: "Time to Beat".to_string(),
            year_column: "Year".to_string(),
            score_column: "Score".to_string(),
        }
    }
}

/// Lookup service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub search_path: String,
    pub user_agent: String,
    /// HTTP request timeout (seconds)
    pub request_timeout_secs: u64,
    /// HTTP connect timeout (seconds)
    pub connect_timeout_secs: u64,
    /// Upper bound on one search request once a rate-limit permit is held (seconds, 0 = none)
    pub lookup_timeout_secs: u64,
    pub requests_per_second: u32,
    /// Candidates below this title similarity are discarded (0.0-1.0)
    pub minimum_similarity: f64,
    /// Compare titles case-sensitively, as howlongtobeatpy does
    pub case_sensitive: bool,
    pub page_size: u32,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://howlongtobeat.com".to_string(),
            search_path: "/api/search".to_string(),
            user_agent: get_user_agent(),
            request_timeout_secs: 15,
            connect_timeout_secs: 5,
            lookup_timeout_secs: 30,
            requests_per_second: 1,
            minimum_similarity: 0.4,
            case_sensitive: true,
            page_size: 20,
        }
    }
}

/// Table update settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Maximum lookups in flight (1 = strictly sequential)
    pub concurrency: usize,
    /// Re-query cells that a previous run marked as not found
    pub retry_not_found: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            retry_not_found: false,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or EnvFilter directive (e.g. "info", "gamefill=debug")
    pub level: String,
    /// Append logs to this file instead of stdout
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

impl TomlConfig {
    /// Reject settings the updater cannot run with
    pub fn validate(&self) -> Result<()> {
        let table = &self.table;
        for (key, value) in [
            ("table.name", &table.name),
            ("table.title_column", &table.title_column),
            ("table.duration_column", &table.duration_column),
            ("table.year_column", &table.year_column),
            ("table.score_column", &table.score_column),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", key)));
            }
        }

        if self.lookup.requests_per_second == 0 {
            return Err(Error::Config(
                "lookup.requests_per_second must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.lookup.minimum_similarity) {
            return Err(Error::Config(format!(
                "lookup.minimum_similarity must be within 0.0-1.0, got {}",
                self.lookup.minimum_similarity
            )));
        }
        if self.lookup.request_timeout_secs == 0 || self.lookup.connect_timeout_secs == 0 {
            return Err(Error::Config(
                "lookup request and connect timeouts must be at least 1 second".to_string(),
            ));
        }
        if self.lookup.page_size == 0 {
            return Err(Error::Config("lookup.page_size must be at least 1".to_string()));
        }
        if self.enrich.concurrency == 0 {
            return Err(Error::Config("enrich.concurrency must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Standard user-agent for outgoing lookup requests
pub fn get_user_agent() -> String {
    format!("gamefill/{}", env!("CARGO_PKG_VERSION"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Serialize a config to TOML, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Config file resolution, in priority order:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. `<user config dir>/gamefill/config.toml`, only if it exists
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|path| path.exists())
}

/// Platform config file location (`~/.config/gamefill/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gamefill").join("config.toml"))
}

/// Dataset resolution, in priority order:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML `dataset` key
/// 4. Compiled default
pub fn resolve_dataset_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATASET_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.dataset {
        return path.clone();
    }

    PathBuf::from(DEFAULT_DATASET)
}
