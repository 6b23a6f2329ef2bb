//! Metrics backend seam.
//!
//! # Responsibilities
//! - Define the one-call-per-point `put_metric` contract
//! - Provide per-invocation backend handles via [`BackendFactory`]
//! - Ship the in-process adapters (Prometheus facade, memory)
//!
//! The HTTP ingest adapter lives in `http_backend.rs`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::schema::{BackendKind, MetricsConfig};
use crate::emitter::http_backend::HttpBackend;
use crate::emitter::observation::MetricObservation;
use crate::observability;

/// Errors returned by a metrics backend submission.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The backend could not be reached.
    #[error("metrics backend unreachable: {0}")]
    Transport(String),

    /// The backend answered but refused the data point.
    #[error("metrics backend rejected data point with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The backend is not usable as configured.
    #[error("metrics backend unavailable: {0}")]
    Unavailable(String),
}

/// Accepts one timestamped, dimensioned data point per call.
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Submit a single observation. Succeeds or fails atomically.
    async fn put_metric(&self, observation: &MetricObservation) -> Result<(), MetricsError>;
}

/// Creates a backend handle scoped to one invocation.
pub trait BackendFactory: Send + Sync {
    fn create(&self) -> Box<dyn MetricsBackend>;
}

/// Records observations through the `metrics` facade.
///
/// Values land in a gauge and a histogram named after the observation
/// (`ping_latency_milliseconds`), labelled by the lowercased dimensions.
/// Submissions fail with [`MetricsError::Unavailable`] until the Prometheus
/// exporter is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusBackend;

impl PrometheusBackend {
    /// Series name derived from namespace, metric name and unit.
    pub fn series_name(observation: &MetricObservation) -> String {
        format!(
            "{}_{}_{}",
            observation.namespace, observation.metric_name, observation.unit
        )
        .to_lowercase()
    }

    fn labels(observation: &MetricObservation) -> Vec<metrics::Label> {
        observation
            .dimensions
            .iter()
            .map(|d| metrics::Label::new(d.name.to_lowercase(), d.value.clone()))
            .collect()
    }
}

#[async_trait]
impl MetricsBackend for PrometheusBackend {
    async fn put_metric(&self, observation: &MetricObservation) -> Result<(), MetricsError> {
        if !observability::metrics::exporter_installed() {
            return Err(MetricsError::Unavailable(
                "Prometheus exporter is not installed".to_string(),
            ));
        }

        let name = Self::series_name(observation);
        let labels = Self::labels(observation);
        let value = observation.value as f64;

        metrics::gauge!(name.clone(), labels.clone()).set(value);
        metrics::histogram!(format!("{}_distribution", name), labels).record(value);
        Ok(())
    }
}

impl BackendFactory for PrometheusBackend {
    fn create(&self) -> Box<dyn MetricsBackend> {
        Box::new(*self)
    }
}

/// Keeps observations in memory. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    observations: Arc<Mutex<Vec<MetricObservation>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn observations(&self) -> Vec<MetricObservation> {
        match self.observations.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MetricsBackend for MemoryBackend {
    async fn put_metric(&self, observation: &MetricObservation) -> Result<(), MetricsError> {
        tracing::debug!(value = observation.value, "Recorded observation in memory");
        self.observations
            .lock()
            .map_err(|_| MetricsError::Unavailable("memory backend lock poisoned".to_string()))?
            .push(observation.clone());
        Ok(())
    }
}

impl BackendFactory for MemoryBackend {
    fn create(&self) -> Box<dyn MetricsBackend> {
        Box::new(self.clone())
    }
}

/// Factory selected by the `[metrics]` config section.
#[derive(Debug, Clone)]
pub struct ConfiguredBackend {
    config: MetricsConfig,
    region: String,
    memory: MemoryBackend,
}

impl ConfiguredBackend {
    pub fn new(config: MetricsConfig, region: impl Into<String>) -> Self {
        Self {
            config,
            region: region.into(),
            memory: MemoryBackend::new(),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.config.backend
    }
}

impl BackendFactory for ConfiguredBackend {
    fn create(&self) -> Box<dyn MetricsBackend> {
        match self.config.backend {
            BackendKind::Prometheus => Box::new(PrometheusBackend),
            BackendKind::Memory => Box::new(self.memory.clone()),
            BackendKind::Http => Box::new(HttpBackend::new(
                self.config.ingest_url.clone().unwrap_or_default(),
                self.region.clone(),
                Duration::from_secs(self.config.timeout_secs),
            )),
        }
    }
}
