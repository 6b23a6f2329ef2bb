//! HTTP ingest adapter.
//!
//! Posts one JSON document per data point:
//!
//! ```text
//! {
//!   "Namespace": "Ping",
//!   "Region": "us-east-1",
//!   "MetricData": [{
//!     "MetricName": "Latency",
//!     "Dimensions": [{"Name": "Target", "Value": "kraken"},
//!                    {"Name": "Environment", "Value": "prod"}],
//!     "Unit": "Milliseconds",
//!     "Value": 87,
//!     "Timestamp": 1700000000000
//!   }]
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::emitter::backend::{MetricsBackend, MetricsError};
use crate::emitter::observation::{Dimension, MetricObservation, Unit};
use crate::probe::result::error_chain;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PutMetricRequest<'a> {
    namespace: &'a str,
    region: &'a str,
    metric_data: [MetricDatum<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MetricDatum<'a> {
    metric_name: &'a str,
    dimensions: &'a [Dimension],
    unit: Unit,
    value: u64,
    timestamp: u64,
}

impl<'a> PutMetricRequest<'a> {
    pub(crate) fn new(observation: &'a MetricObservation, region: &'a str) -> Self {
        Self {
            namespace: observation.namespace,
            region,
            metric_data: [MetricDatum {
                metric_name: observation.metric_name,
                dimensions: &observation.dimensions,
                unit: observation.unit,
                value: observation.value,
                timestamp: observation.timestamp_millis(),
            }],
        }
    }
}

/// Pushes observations to a remote ingest endpoint.
///
/// The HTTP client is built on each submission; a backend handle lives for one
/// invocation only.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    ingest_url: String,
    region: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(ingest_url: impl Into<String>, region: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ingest_url: ingest_url.into(),
            region: region.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MetricsBackend for HttpBackend {
    async fn put_metric(&self, observation: &MetricObservation) -> Result<(), MetricsError> {
        if self.ingest_url.is_empty() {
            return Err(MetricsError::Unavailable("no ingest_url configured".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| MetricsError::Unavailable(error_chain(&e)))?;

        let payload = PutMetricRequest::new(observation, &self.region);
        let response = client
            .post(&self.ingest_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MetricsError::Transport(error_chain(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetricsError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(
            ingest_url = %self.ingest_url,
            value = observation.value,
            "Submitted observation"
        );
        Ok(())
    }
}
