//! Configuration schema definitions.
//!
//! Host-process settings only. Per-invocation data (the target descriptor)
//! never comes from here; namespace, metric name, unit, header set and
//! cadence are compiled in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{self, Environment};
use crate::probe::{ProbeSettings, TargetDescriptor, TargetError};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PingConfig {
    /// Environment whose catalog targets are probed when `targets` is empty.
    pub environment: Environment,

    /// Region this process runs in.
    pub region: String,

    /// Explicit targets; overrides the catalog when non-empty.
    pub targets: Vec<TargetConfig>,

    /// Probe client settings.
    pub probe: ProbeConfig,

    /// Metrics backend selection.
    pub metrics: MetricsConfig,

    /// Logging and self-metrics.
    pub observability: ObservabilityConfig,

    /// Dead-letter queue settings.
    pub dead_letter: DeadLetterConfig,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            region: "us-east-1".to_string(),
            targets: Vec::new(),
            probe: ProbeConfig::default(),
            metrics: MetricsConfig::default(),
            observability: ObservabilityConfig::default(),
            dead_letter: DeadLetterConfig::default(),
        }
    }
}

impl PingConfig {
    /// Targets to schedule: explicit ones if any, otherwise the catalog.
    pub fn resolved_targets(&self) -> Result<Vec<TargetDescriptor>, TargetError> {
        if self.targets.is_empty() {
            return Ok(catalog::targets_for(self.environment));
        }

        self.targets
            .iter()
            .map(|t| t.to_descriptor(self.environment))
            .collect()
    }
}

/// An explicitly configured target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    pub name: String,
    pub url: String,

    /// Defaults to the top-level `environment`.
    #[serde(default)]
    pub environment: Option<String>,
}

impl TargetConfig {
    pub fn to_descriptor(&self, fallback: Environment) -> Result<TargetDescriptor, TargetError> {
        let environment = self
            .environment
            .clone()
            .unwrap_or_else(|| fallback.as_str().to_string());
        TargetDescriptor::new(self.name.clone(), self.url.clone(), environment)
    }
}

/// Probe client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Request timeout in seconds, body included.
    pub timeout_secs: u64,

    /// Honour proxy settings from the environment.
    pub use_system_proxy: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            use_system_proxy: true,
        }
    }
}

impl ProbeConfig {
    pub fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            use_system_proxy: self.use_system_proxy,
        }
    }
}

/// Which metrics backend receives latency points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `metrics` facade, scraped from the Prometheus exporter.
    Prometheus,
    /// JSON POST to `ingest_url`.
    Http,
    /// In-process only.
    Memory,
}

/// Metrics backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub backend: BackendKind,

    /// Ingest endpoint, required for the `http` backend.
    pub ingest_url: Option<String>,

    /// Submission timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Prometheus,
            ingest_url: None,
            timeout_secs: 5,
        }
    }
}

/// Log output format for operational tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Tracing output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Scrape endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Dead-letter queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeadLetterConfig {
    /// Entries kept before the oldest is evicted.
    pub capacity: usize,
}

impl Default for DeadLetterConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PingConfig::default();
        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.probe.timeout_secs, 10);
        assert_eq!(config.metrics.backend, BackendKind::Prometheus);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert_eq!(config.dead_letter.capacity, 1000);
    }

    #[test]
    fn test_empty_targets_fall_back_to_catalog() {
        let mut config = PingConfig::default();
        config.environment = Environment::Devo;
        let targets = config.resolved_targets().unwrap();
        assert_eq!(targets.len(), 4);
        assert!(targets.iter().all(|t| t.environment() == "devo"));
    }

    #[test]
    fn test_explicit_targets_inherit_environment() {
        let mut config = PingConfig::default();
        config.targets.push(TargetConfig {
            name: "kraken".into(),
            url: "https://api.kraken.com/0/public/Time".into(),
            environment: None,
        });
        config.targets.push(TargetConfig {
            name: "local".into(),
            url: "http://127.0.0.1:8080/time".into(),
            environment: Some("devo".into()),
        });

        let targets = config.resolved_targets().unwrap();
        assert_eq!(targets[0].environment(), "prod");
        assert_eq!(targets[1].environment(), "devo");
    }

    #[test]
    fn test_probe_settings_conversion() {
        let probe = ProbeConfig {
            timeout_secs: 3,
            use_system_proxy: false,
        };
        let settings = probe.settings();
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert!(!settings.use_system_proxy);
    }
}
