//! Probe result → (optional metric, mandatory log record).

use thiserror::Error;

use crate::emitter::backend::{MetricsBackend, MetricsError};
use crate::emitter::log_record::LogRecord;
use crate::emitter::observation::MetricObservation;
use crate::emitter::sink::LogSink;
use crate::probe::{ProbeResult, TargetDescriptor};

/// What happened to the latency metric.
#[derive(Debug)]
pub enum MetricStatus {
    /// Probe succeeded and the backend accepted the point.
    Emitted(MetricObservation),
    /// Probe was not a success; nothing sent.
    Suppressed,
    /// Probe succeeded but the backend refused or was unreachable.
    Failed {
        observation: MetricObservation,
        error: MetricsError,
    },
}

impl MetricStatus {
    pub fn is_emitted(&self) -> bool {
        matches!(self, MetricStatus::Emitted(_))
    }
}

/// Errors writing the diagnostic record.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write log record: {0}")]
    Sink(#[from] std::io::Error),
}

/// Outcome of one emit call.
#[derive(Debug)]
pub struct EmitReport {
    pub metric: MetricStatus,
    pub record: LogRecord,
}

/// Sends the metric (on success) and always writes the log record.
pub struct MetricEmitter<'a> {
    backend: &'a dyn MetricsBackend,
    sink: &'a dyn LogSink,
}

impl<'a> MetricEmitter<'a> {
    pub fn new(backend: &'a dyn MetricsBackend, sink: &'a dyn LogSink) -> Self {
        Self { backend, sink }
    }

    /// Submit the metric, then write the log record regardless of the
    /// submission outcome.
    pub async fn emit(
        &self,
        target: &TargetDescriptor,
        result: &ProbeResult,
    ) -> Result<EmitReport, EmitError> {
        let metric = match MetricObservation::from_probe(target, result) {
            Some(observation) => match self.backend.put_metric(&observation).await {
                Ok(()) => {
                    tracing::debug!(value = observation.value, "Latency metric emitted");
                    MetricStatus::Emitted(observation)
                }
                Err(error) => {
                    tracing::error!(error = %error, "Latency metric submission failed");
                    MetricStatus::Failed { observation, error }
                }
            },
            None => {
                tracing::debug!(
                    status = ?result.status_code,
                    failure = ?result.failure,
                    "Latency metric suppressed"
                );
                MetricStatus::Suppressed
            }
        };

        let record = LogRecord::from_probe(result);
        self.sink.write_record(&record.to_line()?)?;

        Ok(EmitReport { metric, record })
    }
}
