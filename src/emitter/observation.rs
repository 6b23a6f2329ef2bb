//! Metric observation handed to the metrics backend.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::probe::{ProbeResult, TargetDescriptor};

/// Metric family.
pub const NAMESPACE: &str = "Ping";
/// Metric name within the family.
pub const METRIC_NAME: &str = "Latency";
/// First dimension: probed service.
pub const TARGET_DIMENSION: &str = "Target";
/// Second dimension: deployment environment.
pub const ENVIRONMENT_DIMENSION: &str = "Environment";

/// Unit of the observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    Milliseconds,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Milliseconds => "Milliseconds",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One name/value pair. Order within an observation is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single timestamped latency data point.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricObservation {
    pub namespace: &'static str,
    pub metric_name: &'static str,
    /// Always `[Target, Environment]`, in that order.
    pub dimensions: Vec<Dimension>,
    pub unit: Unit,
    pub value: u64,
    pub timestamp: SystemTime,
}

impl MetricObservation {
    /// Latency observation for a target.
    pub fn latency(target: &TargetDescriptor, value: u64) -> Self {
        Self {
            namespace: NAMESPACE,
            metric_name: METRIC_NAME,
            dimensions: vec![
                Dimension::new(TARGET_DIMENSION, target.name()),
                Dimension::new(ENVIRONMENT_DIMENSION, target.environment()),
            ],
            unit: Unit::Milliseconds,
            value,
            timestamp: SystemTime::now(),
        }
    }

    /// Observation for a probe, or `None` when the probe was not a success.
    pub fn from_probe(target: &TargetDescriptor, result: &ProbeResult) -> Option<Self> {
        result
            .is_success()
            .then(|| Self::latency(target, result.elapsed_ms))
    }

    /// Look up a dimension value by name.
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}
