//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::registry::backend::{parse_backend_list, Backend};

/// Environment variable holding the initial comma-separated backend list.
pub const BACKENDS_ENV: &str = "BACKEND_SERVERS";

/// Error type for configuration loading. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Environment variable {0} is not set")]
    MissingBackends(&'static str),

    #[error("Environment variable {0} contains no backend addresses")]
    EmptyBackends(&'static str),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read the initial backend set from `BACKEND_SERVERS`.
pub fn backends_from_env() -> Result<Vec<Backend>, ConfigError> {
    backends_from_value(std::env::var(BACKENDS_ENV).ok().as_deref())
}

/// Parse the raw value of the backend variable, failing when it is unset or yields nothing.
pub fn backends_from_value(value: Option<&str>) -> Result<Vec<Backend>, ConfigError> {
    let raw = value.ok_or(ConfigError::MissingBackends(BACKENDS_ENV))?;
    let backends = parse_backend_list(raw);
    if backends.is_empty() {
        return Err(ConfigError::EmptyBackends(BACKENDS_ENV));
    }
    Ok(backends)
}
