//! Layered client configuration.
//!
//! Values come from, highest priority first: command-line flags, the
//! environment, `<data_dir>/config.toml`, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::api::{ClientConfig, Method};
use crate::platform::data_dir;

pub const ENDPOINT_ENV: &str = "INSTAMOJO_ENDPOINT";
pub const APP_ID_ENV: &str = "INSTAMOJO_APP_ID";

const CONFIG_FILE: &str = "config.toml";
const TOKEN_FILE: &str = "auth.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Cannot determine data directory: {0}")]
    DataDir(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of `config.toml`. Every key is optional.
#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub app_id: Option<String>,
    pub auth_header: Option<String>,
    pub allowed_methods: Option<Vec<Method>>,
    pub strict_token_load: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub token_file: Option<PathBuf>,
}

impl FileConfig {
    /// Load config from `path`, returning default if the file doesn't exist.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded config from {}", path.display());
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line.
#[derive(Debug, Default)]
pub struct Overrides<'a> {
    pub endpoint: Option<&'a str>,
    pub app_id: Option<&'a str>,
    pub token_file: Option<&'a Path>,
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub client: ClientConfig,
    pub token_file: PathBuf,
}

pub fn default_config_path() -> ConfigResult<PathBuf> {
    let dir = data_dir().map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir.join(CONFIG_FILE))
}

/// Merge every configuration source. `env` looks up environment variables.
pub fn resolve(
    file: FileConfig,
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> ConfigResult<Settings> {
    let defaults = ClientConfig::default();

    let endpoint = overrides
        .endpoint
        .map(str::to_string)
        .or_else(|| env(ENDPOINT_ENV))
        .or(file.endpoint)
        .unwrap_or(defaults.endpoint.clone());
    reqwest::Url::parse(&endpoint)
        .map_err(|e| ConfigError::Invalid(format!("endpoint '{}': {}", endpoint, e)))?;

    let app_id = overrides
        .app_id
        .map(str::to_string)
        .or_else(|| env(APP_ID_ENV))
        .or(file.app_id)
        .unwrap_or(defaults.app_id.clone());

    let auth_header = file.auth_header.unwrap_or(defaults.auth_header.clone());
    if auth_header.trim().is_empty() {
        return Err(ConfigError::Invalid("auth_header must not be empty".to_string()));
    }

    let allowed_methods = file
        .allowed_methods
        .unwrap_or(defaults.allowed_methods.clone());
    if allowed_methods.is_empty() {
        return Err(ConfigError::Invalid(
            "allowed_methods must list at least one method".to_string(),
        ));
    }

    let timeout = match file.timeout_secs {
        Some(0) => return Err(ConfigError::Invalid("timeout_secs must be positive".to_string())),
        Some(secs) => Duration::from_secs(secs),
        None => defaults.timeout,
    };

    let token_file = match overrides.token_file.map(Path::to_path_buf).or(file.token_file) {
        Some(path) => path,
        None => data_dir()
            .map_err(|e| ConfigError::DataDir(e.to_string()))?
            .join(TOKEN_FILE),
    };

    let client = ClientConfig {
        auth_header,
        allowed_methods,
        strict_token_load: file.strict_token_load.unwrap_or(defaults.strict_token_load),
        timeout,
        ..defaults
    }
    .with_endpoint(&endpoint)
    .with_app_id(app_id);

    debug!(
        "Resolved config: endpoint={} app_id={} token_file={}",
        client.endpoint,
        client.app_id,
        token_file.display()
    );

    Ok(Settings { client, token_file })
}
