//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
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
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [fetch]
            max_size_bytes = 2048
            fallback_content_type = "application/octet-stream"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.fetch.max_size_bytes, 2048);
        assert_eq!(config.fetch.fallback_content_type, "application/octet-stream");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[fetch\ntimeout_ms = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors_are_reported_together() {
        let err = parse_config(
            r#"
            [fetch]
            timeout_ms = 0
            max_size_bytes = 0
            "#,
        )
        .unwrap_err();

        match &err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("timeout_ms"));
        assert!(err.to_string().contains("max_size_bytes"));
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("safe-url-proxy.example.toml");
        let config = load_config(&path).unwrap();
        let defaults = ProxyConfig::default();

        assert_eq!(config.fetch.timeout_ms, defaults.fetch.timeout_ms);
        assert_eq!(config.fetch.max_size_bytes, defaults.fetch.max_size_bytes);
        assert_eq!(config.fetch.user_agent, defaults.fetch.user_agent);
        assert_eq!(config.listener.bind_address, defaults.listener.bind_address);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/safe-url-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
