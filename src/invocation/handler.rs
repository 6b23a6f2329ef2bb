//! Invocation entry point: descriptor in, metric + log record out.
//!
//! # Responsibilities
//! - Parse and validate the scheduler's input object
//! - Create the probe client and metrics backend handle for this call only
//! - Drive probe → emit and trace each state transition
//! - Report backend failures after the log record is written

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::PingConfig;
use crate::emitter::{
    BackendFactory, ConfiguredBackend, EmitError, EmitReport, LogRecord, LogSink, MetricEmitter,
    MetricStatus, MetricsError,
};
use crate::invocation::state::{InvocationState, StateTracker};
use crate::observability::metrics;
use crate::probe::{ProbeExecutor, ProbeResult, ProbeSettings, TargetDescriptor};

/// Errors surfaced to the scheduler's invocation-status accounting.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The input object was not a valid target descriptor.
    #[error("invalid target descriptor: {0}")]
    InvalidTarget(#[from] serde_json::Error),

    /// The latency point was not accepted. The log record was still written.
    #[error("metric submission failed: {0}")]
    MetricSubmission(#[from] MetricsError),

    /// The diagnostic record could not be written.
    #[error("log sink write failed: {0}")]
    LogSink(#[from] EmitError),
}

/// Everything one invocation produced.
#[derive(Debug)]
pub struct InvocationReport {
    pub invocation_id: Uuid,
    pub target: TargetDescriptor,
    pub result: ProbeResult,
    pub metric: MetricStatus,
    pub record: LogRecord,
    pub final_state: InvocationState,
}

/// Runs invocations. Holds no per-invocation state; cheap to clone and share.
#[derive(Clone)]
pub struct Handler {
    probe: ProbeSettings,
    backends: Arc<dyn BackendFactory>,
    sink: Arc<dyn LogSink>,
}

impl Handler {
    pub fn new(backends: Arc<dyn BackendFactory>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            probe: ProbeSettings::default(),
            backends,
            sink,
        }
    }

    /// Handler wired from the `[probe]` and `[metrics]` sections.
    pub fn from_config(config: &PingConfig, sink: Arc<dyn LogSink>) -> Self {
        let backends = ConfiguredBackend::new(config.metrics.clone(), config.region.clone());
        Self::new(Arc::new(backends), sink).with_probe_settings(config.probe.settings())
    }

    pub fn with_probe_settings(mut self, settings: ProbeSettings) -> Self {
        self.probe = settings;
        self
    }

    /// Handle a raw `{"name", "url", "environment"}` input object.
    pub async fn handle_json(&self, input: &str) -> Result<InvocationReport, InvocationError> {
        let target: TargetDescriptor = serde_json::from_str(input)?;
        self.handle(&target).await
    }

    /// Run one invocation for `target`.
    pub async fn handle(&self, target: &TargetDescriptor) -> Result<InvocationReport, InvocationError> {
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "invocation",
            %invocation_id,
            target = %target.name(),
            environment = %target.environment(),
        );
        self.run(invocation_id, target).instrument(span).await
    }

    async fn run(
        &self,
        invocation_id: Uuid,
        target: &TargetDescriptor,
    ) -> Result<InvocationReport, InvocationError> {
        let mut state = StateTracker::new();

        // Both handles are dropped when this invocation returns.
        let backend = self.backends.create();
        let result = match ProbeExecutor::new(self.probe) {
            Ok(executor) => {
                state.advance();
                executor.probe(target).await
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build probe client");
                state.advance();
                ProbeResult::from_error(target.url().to_string(), None, Duration::ZERO, None, &e)
            }
        };

        state.probe_finished(result.is_success());
        if let Some(failure) = result.failure {
            metrics::record_probe_failure(target.name(), failure.as_str());
        }

        let emitter = MetricEmitter::new(backend.as_ref(), self.sink.as_ref());
        let emitted = emitter.emit(target, &result).await;
        state.advance();
        if emitted.is_ok() {
            state.advance();
        }
        let final_state = state.finish();

        metrics::record_invocation(target.name(), target.environment(), result.outcome());

        let EmitReport { metric, record } = emitted?;
        tracing::info!(
            status = ?result.status_code,
            latency_ms = result.elapsed_ms,
            metric_emitted = metric.is_emitted(),
            "Invocation complete"
        );

        if let MetricStatus::Failed { error, .. } = metric {
            metrics::record_submit_failure(target.name());
            return Err(InvocationError::MetricSubmission(error));
        }

        Ok(InvocationReport {
            invocation_id,
            target: target.clone(),
            result,
            metric,
            record,
            final_state,
        })
    }
}
