//! Structured diagnostic record written once per invocation.

use serde::Serialize;
use serde_json::Value;

use crate::probe::ProbeResult;

/// One line in the diagnostic log. Keys serialize in declaration order:
/// `Path`, `Request`, `Status`, `Reason`, `Response`, `Latency`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogRecord {
    pub path: String,
    pub request: Option<String>,
    /// `null` when the request never got a response.
    pub status: Option<u16>,
    pub reason: String,
    pub response: Option<Value>,
    /// `"<integer>ms"`.
    pub latency: String,
}

impl LogRecord {
    pub fn from_probe(result: &ProbeResult) -> Self {
        Self {
            path: result.request_url.clone(),
            request: result.request_body.clone(),
            status: result.status_code,
            reason: result.reason.clone(),
            response: result.response_body.clone(),
            latency: result.latency_label(),
        }
    }

    /// Serialize to a single line of JSON.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
