//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, paths and value ranges
//! - Check header filter entries are usable header names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }

    let path = &config.relay.path;
    if !path.starts_with('/') || path.len() < 2 {
        errors.push(ValidationError::new(
            "relay.path",
            format!("'{}' must start with '/' and name a route", path),
        ));
    } else if path.contains(['{', '}', '*']) || path.contains("/:") {
        errors.push(ValidationError::new(
            "relay.path",
            format!("'{}' must not contain route captures", path),
        ));
    }

    if config.relay.max_body_bytes == 0 {
        errors.push(ValidationError::new("relay.max_body_bytes", "must be greater than 0"));
    }

    for prefix in &config.headers.strip_prefixes {
        if !is_header_token(prefix) {
            errors.push(ValidationError::new(
                "headers.strip_prefixes",
                format!("'{}' is not a lowercase header name prefix", prefix),
            ));
        }
    }
    for name in &config.headers.strip_names {
        if !is_header_token(name) {
            errors.push(ValidationError::new(
                "headers.strip_names",
                format!("'{}' is not a lowercase header name", name),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-empty, lowercase, and made of header token characters.
fn is_header_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_lowercase()
                || b.is_ascii_digit()
                || matches!(b, b'-' | b'_' | b'.' | b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'^' | b'`' | b'|' | b'~')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.connect_secs = 0;
        config.relay.path = "api".into();
        config.headers.strip_prefixes.push("X-Upper-".into());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "timeouts.connect_secs",
                "relay.path",
                "headers.strip_prefixes",
            ]
        );
    }

    #[test]
    fn rejects_root_and_wildcard_paths() {
        let mut config = RelayConfig::default();
        config.relay.path = "/".into();
        assert!(validate_config(&config).is_err());

        config.relay.path = "/{*rest}".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
