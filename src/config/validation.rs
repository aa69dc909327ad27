//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let fanout = &config.fanout;
    if fanout.attempt_timeout_ms == 0 {
        errors.push(ValidationError::new("fanout.attempt_timeout_ms", "must be greater than 0"));
    }
    if fanout.max_body_bytes == 0 {
        errors.push(ValidationError::new("fanout.max_body_bytes", "must be greater than 0"));
    }
    if fanout.drain_limit_bytes == 0 {
        errors.push(ValidationError::new("fanout.drain_limit_bytes", "must be greater than 0"));
    }
    if fanout.drain_timeout_ms == 0 {
        errors.push(ValidationError::new("fanout.drain_timeout_ms", "must be greater than 0"));
    }
    if fanout.relay_idle_timeout_ms == 0 {
        errors.push(ValidationError::new("fanout.relay_idle_timeout_ms", "must be greater than 0"));
    }

    let path = &config.admin.update_path;
    if !path.starts_with('/') || path == "/" || path.contains(&['{', '}', '*'][..]) {
        errors.push(ValidationError::new(
            "admin.update_path",
            "must be a literal path starting with '/'",
        ));
    }
    if matches!(&config.admin.api_key, Some(key) if key.trim().is_empty()) {
        errors.push(ValidationError::new("admin.api_key", "must not be blank when set"));
    }

    let observability = &config.observability;
    if !matches!(observability.log_format.as_str(), "text" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}'", observability.log_format),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.fanout.max_body_bytes = 0;
        config.fanout.drain_limit_bytes = 0;
        config.fanout.relay_idle_timeout_ms = 0;
        config.admin.update_path = "/".into();
        config.observability.log_format = "yaml".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "listener.bind_address",
                "fanout.max_body_bytes",
                "fanout.drain_limit_bytes",
                "fanout.relay_idle_timeout_ms",
                "admin.update_path",
                "observability.log_format",
            ]
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn update_path_must_be_literal() {
        let mut config = ProxyConfig::default();
        for bad in ["-update-backends", "/{*rest}", "/admin/{id}"] {
            config.admin.update_path = bad.into();
            assert!(validate_config(&config).is_err(), "{bad}");
        }
    }
}
