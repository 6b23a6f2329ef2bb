//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PingConfig;
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
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<PingConfig, ConfigError> {
    let config: PingConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PingConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Environment;
    use crate::config::schema::{BackendKind, LogFormat};

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            environment = "devo"
            region = "ap-northeast-1"

            [probe]
            timeout_secs = 4

            [metrics]
            backend = "http"
            ingest_url = "http://127.0.0.1:9999/ingest"

            [observability]
            log_format = "json"
            metrics_enabled = false

            [[targets]]
            name = "kraken"
            url = "https://api.kraken.com/0/public/Time"
            "#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Devo);
        assert_eq!(config.region, "ap-northeast-1");
        assert_eq!(config.probe.timeout_secs, 4);
        assert!(config.probe.use_system_proxy);
        assert_eq!(config.metrics.backend, BackendKind::Http);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.targets.len(), 1);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.environment, Environment::Prod);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("environment = \"staging\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_everything() {
        let err = parse_config(
            r#"
            region = "nowhere"
            [probe]
            timeout_secs = 0
            "#,
        )
        .unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Validation failed: "));
        assert!(text.contains("probe.timeout_secs"));
        assert!(text.contains("unknown region `nowhere`"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here/ping.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
