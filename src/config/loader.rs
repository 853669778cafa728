//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{NodeConfig, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables that each contribute one node, in pool order.
pub const NODE_ENDPOINT_VARS: [&str; 5] = [
    "ALCHEMY_ENDPOINT",
    "QUICKNODE_ENDPOINT",
    "CHAINSTACK_ENDPOINT",
    "TENDERLY_ENDPOINT",
    "INFURA_ENDPOINT",
];

pub const ENV_REQUEST_TIMEOUT: &str = "NODE_REQUEST_TIMEOUT_SECONDS";
pub const ENV_MAX_RETRIES: &str = "MAX_RETRIES";
pub const ENV_CACHE_EXPIRATION: &str = "CACHE_EXPIRATION_SECONDS";
pub const ENV_LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";

/// Set to `production` to skip the `.env` file.
pub const ENV_APP_ENV: &str = "APP_ENV";
pub const DOTENV_FILE: &str = ".env";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load `path` into the process environment outside production.
///
/// Variables already present in the environment are not overwritten. A
/// missing file is not an error; a malformed one is. Returns whether the
/// file was loaded.
pub fn load_dotenv(path: &Path, app_env: Option<&str>) -> Result<bool, ConfigError> {
    if app_env == Some("production") || !path.exists() {
        return Ok(false);
    }
    dotenvy::from_path(path)?;
    Ok(true)
}

/// Parse a TOML file without applying overrides or validation.
pub fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Resolve the startup configuration: file (if any), then process
/// environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides through `lookup`.
///
/// Numeric values that are absent, unparsable or out of range fall back to
/// the built-in default rather than the file value, matching how the
/// service has always treated a bad environment.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = crate::config::schema::QueryConfig::default();

    if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
        config.query.request_timeout_secs =
            positive(&raw).unwrap_or(defaults.request_timeout_secs);
    }

    if let Some(raw) = lookup(ENV_MAX_RETRIES) {
        config.query.max_retries = match raw.trim().parse::<i64>() {
            Ok(n) if n >= 0 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => defaults.max_retries,
        };
    }

    if let Some(raw) = lookup(ENV_CACHE_EXPIRATION) {
        config.query.cache_ttl_secs = positive(&raw).unwrap_or(defaults.cache_ttl_secs);
    }

    if let Some(addr) = lookup(ENV_LISTEN_ADDRESS).filter(|a| !a.trim().is_empty()) {
        config.listener.bind_address = addr.trim().to_string();
    }

    for var in NODE_ENDPOINT_VARS {
        let Some(url) = lookup(var).filter(|u| !u.trim().is_empty()) else {
            continue;
        };
        if config.nodes.iter().any(|n| n.name == var) {
            tracing::debug!(node = var, "Node already configured from file, ignoring environment");
            continue;
        }
        config.nodes.push(NodeConfig::new(var, url.trim()));
    }
}

fn positive(raw: &str) -> Option<u64> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Some(n as u64),
        _ => None,
    }
}
