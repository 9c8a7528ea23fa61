//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    let config: RelayConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{BodyMode, OriginPolicy};

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.relay.path, "/api/proxy");
        assert_eq!(config.relay.body_mode, BodyMode::Json);
        assert_eq!(config.cors.origin_policy, OriginPolicy::Wildcard);
        assert_eq!(config.headers.strip_prefixes, vec!["x-vercel-", "sec-fetch-"]);
    }

    #[test]
    fn sections_override_defaults() {
        let toml = r#"
            [listener]
            bind_address = "127.0.0.1:3000"

            [relay]
            path = "/relay"
            body_mode = "opaque"

            [cors]
            origin_policy = "echo"

            [headers]
            strip_prefixes = ["cf-"]
        "#;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.relay.path, "/relay");
        assert_eq!(config.relay.body_mode, BodyMode::Opaque);
        assert_eq!(config.cors.origin_policy, OriginPolicy::Echo);
        assert_eq!(config.headers.strip_prefixes, vec!["cf-"]);
        // untouched fields keep defaults
        assert!(config.relay.no_store);
    }

    #[test]
    fn unknown_enum_value_is_parse_error() {
        let err = parse_config("[relay]\nbody_mode = \"xml\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_values_are_validation_error() {
        let err = parse_config("[timeouts]\nupstream_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("upstream_secs"));
    }
}
