//! Probe outcome types.

use std::error::Error as StdError;
use std::time::Duration;

use serde_json::Value;

/// The only status code that counts as a successful probe.
///
/// Other 2xx codes are logged but never reach the latency series.
pub const SUCCESS_STATUS: u16 = 200;

/// Why a probe produced no usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    /// Request or body read exceeded the probe timeout.
    Timeout,
    /// DNS resolution or TCP/TLS connect failed.
    Connect,
    /// The request could not be built (bad URL, bad header).
    InvalidRequest,
    /// Headers arrived but the body could not be read.
    Body,
    /// Anything else reported by the HTTP client.
    Other,
}

impl ProbeFailure {
    /// Classify a client error.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeFailure::Timeout
        } else if err.is_connect() {
            ProbeFailure::Connect
        } else if err.is_builder() {
            ProbeFailure::InvalidRequest
        } else if err.is_body() || err.is_decode() {
            ProbeFailure::Body
        } else {
            ProbeFailure::Other
        }
    }

    /// Stable label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeFailure::Timeout => "timeout",
            ProbeFailure::Connect => "connect",
            ProbeFailure::InvalidRequest => "invalid_request",
            ProbeFailure::Body => "body",
            ProbeFailure::Other => "other",
        }
    }
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one HTTP attempt. Created per invocation and consumed by the emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// HTTP status, absent when no response was received.
    pub status_code: Option<u16>,
    /// Elapsed wall-clock time, floored to whole milliseconds.
    pub elapsed_ms: u64,
    /// URL of the request as sent.
    pub request_url: String,
    /// Body of the request as sent (empty for GET).
    pub request_body: Option<String>,
    /// Parsed JSON payload, or the raw text when the body is not JSON.
    pub response_body: Option<Value>,
    /// Status text, or the error description when the request did not complete.
    pub reason: String,
    /// Set when the request did not complete.
    pub failure: Option<ProbeFailure>,
}

impl ProbeResult {
    /// Build a result for a request that ended in a client error.
    pub fn from_error(
        request_url: String,
        request_body: Option<String>,
        elapsed: Duration,
        status_code: Option<u16>,
        err: &reqwest::Error,
    ) -> Self {
        Self {
            status_code,
            elapsed_ms: truncate_millis(elapsed),
            request_url,
            request_body,
            response_body: None,
            reason: error_chain(err),
            failure: Some(ProbeFailure::classify(err)),
        }
    }

    /// True only for a completed request with status exactly 200.
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.status_code == Some(SUCCESS_STATUS)
    }

    /// Latency formatted for the diagnostic log, e.g. `87ms`.
    pub fn latency_label(&self) -> String {
        format!("{}ms", self.elapsed_ms)
    }

    /// Short outcome label for self-metrics.
    pub fn outcome(&self) -> &'static str {
        if self.is_success() {
            "success"
        } else if self.failure.is_some() {
            "network_error"
        } else {
            "http_error"
        }
    }
}

/// Floor a duration to whole milliseconds via integer microseconds.
pub fn truncate_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros() / 1000).unwrap_or(u64::MAX)
}

/// Best-effort body decoding: JSON if it parses, raw text otherwise.
pub fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

/// Render an error with its source chain, `outer: inner: root`.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(status: u16, elapsed_ms: u64) -> ProbeResult {
        ProbeResult {
            status_code: Some(status),
            elapsed_ms,
            request_url: "https://api.kraken.com/0/public/Time".into(),
            request_body: None,
            response_body: None,
            reason: String::new(),
            failure: None,
        }
    }

    #[test]
    fn test_truncation_is_floor() {
        assert_eq!(truncate_millis(Duration::from_micros(123_999)), 123);
        assert_eq!(truncate_millis(Duration::from_micros(87_400)), 87);
        assert_eq!(truncate_millis(Duration::from_micros(999)), 0);
        // Whole seconds are part of the latency, not dropped.
        assert_eq!(truncate_millis(Duration::from_micros(1_250_700)), 1250);
    }

    #[test]
    fn test_only_exact_200_is_success() {
        assert!(completed(200, 10).is_success());
        assert!(!completed(201, 10).is_success());
        assert!(!completed(204, 10).is_success());
        assert!(!completed(404, 10).is_success());
        assert!(!completed(503, 10).is_success());

        let mut body_failed = completed(200, 10);
        body_failed.failure = Some(ProbeFailure::Body);
        assert!(!body_failed.is_success());
    }

    #[test]
    fn test_latency_label_has_no_decimal_point() {
        let label = completed(200, 87).latency_label();
        assert_eq!(label, "87ms");
        assert!(!label.contains('.'));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(completed(200, 1).outcome(), "success");
        assert_eq!(completed(500, 1).outcome(), "http_error");

        let mut failed = completed(200, 1);
        failed.status_code = None;
        failed.failure = Some(ProbeFailure::Timeout);
        assert_eq!(failed.outcome(), "network_error");
    }

    #[test]
    fn test_parse_body_falls_back_to_raw_text() {
        assert_eq!(
            parse_body(br#"{"serverTime": 1700000000000}"#),
            Some(serde_json::json!({"serverTime": 1700000000000u64}))
        );
        assert_eq!(
            parse_body(b"<html>bad gateway</html>"),
            Some(Value::String("<html>bad gateway</html>".into()))
        );
        assert_eq!(parse_body(b""), None);
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let outer = std::io::Error::new(std::io::ErrorKind::Other, inner);
        let text = error_chain(&outer);
        assert!(text.contains("connection refused"));
    }
}
