//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacity > 0)
//! - Check targets are complete and point at http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: PingConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::catalog;
use crate::config::schema::{BackendKind, PingConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("probe.timeout_secs must be greater than zero")]
    ZeroProbeTimeout,

    #[error("metrics.timeout_secs must be greater than zero")]
    ZeroMetricsTimeout,

    #[error("unknown region `{0}`")]
    UnknownRegion(String),

    #[error("target #{index}: {reason}")]
    InvalidTarget { index: usize, reason: String },

    #[error("duplicate target `{name}` in environment `{environment}`")]
    DuplicateTarget { name: String, environment: String },

    #[error("metrics.backend = \"http\" requires a valid metrics.ingest_url: {0}")]
    InvalidIngestUrl(String),

    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),

    #[error("invalid observability.metrics_address `{0}`")]
    InvalidMetricsAddress(String),

    #[error("dead_letter.capacity must be greater than zero")]
    ZeroDeadLetterCapacity,

    #[error("metrics.backend = \"prometheus\" requires observability.metrics_enabled = true")]
    ScrapeBackendWithoutExporter,

    #[error("metrics.backend = \"prometheus\" cannot be used by a single invocation; select \"http\" or \"memory\"")]
    ScrapeBackendOneShot,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &PingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.probe.timeout_secs == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }
    if config.metrics.timeout_secs == 0 {
        errors.push(ValidationError::ZeroMetricsTimeout);
    }
    if !catalog::is_known_region(&config.region) {
        errors.push(ValidationError::UnknownRegion(config.region.clone()));
    }

    let mut seen = HashSet::new();
    for (index, target) in config.targets.iter().enumerate() {
        let descriptor = match target.to_descriptor(config.environment) {
            Ok(d) => d,
            Err(e) => {
                errors.push(ValidationError::InvalidTarget {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if let Err(reason) = check_http_url(descriptor.url()) {
            errors.push(ValidationError::InvalidTarget { index, reason });
        }

        let key = (descriptor.name().to_string(), descriptor.environment().to_string());
        if !seen.insert(key) {
            errors.push(ValidationError::DuplicateTarget {
                name: descriptor.name().to_string(),
                environment: descriptor.environment().to_string(),
            });
        }
    }

    if config.metrics.backend == BackendKind::Http {
        match config.metrics.ingest_url.as_deref() {
            Some(url) => {
                if let Err(reason) = check_http_url(url) {
                    errors.push(ValidationError::InvalidIngestUrl(reason));
                }
            }
            None => errors.push(ValidationError::InvalidIngestUrl("missing".to_string())),
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.metrics.backend == BackendKind::Prometheus && !config.observability.metrics_enabled {
        errors.push(ValidationError::ScrapeBackendWithoutExporter);
    }

    if config.dead_letter.capacity == 0 {
        errors.push(ValidationError::ZeroDeadLetterCapacity);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Extra checks for the one-shot `invoke` path.
///
/// The process exits right after the invocation, so a scrape-based backend
/// would never be read.
pub fn validate_one_shot(config: &PingConfig) -> Result<(), ValidationError> {
    match config.metrics.backend {
        BackendKind::Prometheus => Err(ValidationError::ScrapeBackendOneShot),
        BackendKind::Http | BackendKind::Memory => Ok(()),
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid url `{}`: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme `{}` in `{}`", other, raw)),
    }
}
