//! Configuration file loading with precedence handling.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML config file,
//! command-line flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.tvmaze.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const CONFIG_ENV_VAR: &str = "SHOW_EXPLORER_CONFIG";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Invalid TOML in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },
}

/// TOML configuration file structure. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_base_url: Option<String>,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Values set explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_file_path: default_log_path(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "tvmaze", "show-explorer")
}

/// `<data dir>/show-explorer.log`, or the working directory when no home
/// directory can be determined.
pub fn default_log_path() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_local_dir().join("show-explorer.log"),
        None => PathBuf::from("show-explorer.log"),
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load a config file. A missing file is `Ok(None)`.
pub fn load_config_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let config = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Pick the config file: explicit path, then `SHOW_EXPLORER_CONFIG`, then
/// the platform default.
pub fn load_config_with_precedence(
    explicit: Option<&Path>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(Path::new(&env_path));
    }
    match default_config_path() {
        Some(path) => load_config_file(&path),
        None => Ok(None),
    }
}

pub fn resolve(file: Option<ConfigFile>, cli: CliOverrides) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();
    let file = file.unwrap_or_default();

    let api_base_url = cli
        .api_base_url
        .or(file.api_base_url)
        .unwrap_or(defaults.api_base_url);
    let timeout = cli
        .request_timeout_secs
        .or(file.request_timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(defaults.request_timeout);

    ResolvedConfig {
        api_base_url: api_base_url.trim_end_matches('/').to_string(),
        request_timeout: timeout,
        log_file_path: cli
            .log_file_path
            .or(file.log_file_path)
            .unwrap_or(defaults.log_file_path),
    }
}
