//! Self-metrics and Prometheus exposition.
//!
//! # Metrics
//! - `ping_invocations_total` (counter): by target, environment, outcome
//! - `ping_probe_failures_total` (counter): by target, failure kind
//! - `ping_metric_submit_failures_total` (counter): by target
//! - `ping_dead_letters_total` (counter): by target
//!
//! The latency series itself is written by `emitter::PrometheusBackend`
//! when that backend is selected.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use thiserror::Error;

static EXPORTER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Errors setting up the scrape endpoint.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("invalid metrics address `{0}`")]
    Address(String),

    #[error("failed to install Prometheus exporter: {0}")]
    Install(#[from] BuildError),
}

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), ExporterError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    EXPORTER_INSTALLED.store(true, Ordering::Release);
    describe_metrics();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Parse `address` and install the exporter there.
pub fn init_metrics_at(address: &str) -> Result<(), ExporterError> {
    let addr = address
        .parse::<SocketAddr>()
        .map_err(|_| ExporterError::Address(address.to_string()))?;
    init_metrics(addr)
}

/// Whether a scrape endpoint is serving recorded values.
///
/// Without one the `metrics` facade discards everything it is given.
pub fn exporter_installed() -> bool {
    EXPORTER_INSTALLED.load(Ordering::Acquire)
}

fn describe_metrics() {
    describe_counter!("ping_invocations_total", "Completed probe invocations");
    describe_counter!("ping_probe_failures_total", "Probes that received no response");
    describe_counter!(
        "ping_metric_submit_failures_total",
        "Latency points the metrics backend did not accept"
    );
    describe_counter!("ping_dead_letters_total", "Invocations routed to the dead-letter queue");
    describe_gauge!("ping_latency_milliseconds", "Latest successful probe latency");
}

/// Record one finished invocation.
pub fn record_invocation(target: &str, environment: &str, outcome: &'static str) {
    counter!(
        "ping_invocations_total",
        "target" => target.to_string(),
        "environment" => environment.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a probe that got no response.
pub fn record_probe_failure(target: &str, kind: &'static str) {
    counter!("ping_probe_failures_total", "target" => target.to_string(), "kind" => kind).increment(1);
}

/// Record a rejected or undeliverable latency point.
pub fn record_submit_failure(target: &str) {
    counter!("ping_metric_submit_failures_total", "target" => target.to_string()).increment(1);
}

/// Record a dead-lettered invocation.
pub fn record_dead_letter(target: &str) {
    counter!("ping_dead_letters_total", "target" => target.to_string()).increment(1);
}
