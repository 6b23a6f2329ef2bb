//! Single-shot HTTP probe.
//!
//! # Responsibilities
//! - Send exactly one GET to the target URL with a fixed header set
//! - Measure dispatch → full body receipt
//! - Turn every outcome, including transport failures, into a [`ProbeResult`]
//!
//! # Design Decisions
//! - `Connection: close` and no idle pool: invocations are minutes apart
//! - HTTP/1.1 only, the header set is HTTP/1 specific
//! - No retries; the scheduler and its dead-letter queue own that

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONNECTION, USER_AGENT};
use hyper::ext::ReasonPhrase;
use reqwest::{Client, StatusCode};

use crate::probe::result::{parse_body, truncate_millis, ProbeResult};
use crate::probe::target::TargetDescriptor;

/// User agent sent with every probe.
pub const PROBE_USER_AGENT: &str = concat!("exchange-ping/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Knobs for building a probe client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Upper bound for the whole request, body included.
    pub timeout: Duration,
    /// Honour `HTTP(S)_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
            use_system_proxy: true,
        }
    }
}

/// The fixed header set sent with every probe.
pub fn probe_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(PROBE_USER_AGENT));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    headers
}

/// Status text for the record: the server's phrase when it sent a
/// non-canonical one, the canonical phrase otherwise, `HTTP <code>` as a last
/// resort. Never empty.
pub fn status_reason(status: StatusCode, server_phrase: Option<&[u8]>) -> String {
    if let Some(phrase) = server_phrase {
        let phrase = String::from_utf8_lossy(phrase).trim().to_string();
        if !phrase.is_empty() {
            return phrase;
        }
    }
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("HTTP {}", status.as_u16()),
    }
}

/// Executes one probe with a client scoped to the current invocation.
pub struct ProbeExecutor {
    client: Client,
}

impl ProbeExecutor {
    /// Build an executor with a fresh, non-pooling client.
    pub fn new(settings: ProbeSettings) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .pool_max_idle_per_host(0)
            .http1_only();

        if !settings.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Probe the target once. Never fails: errors are folded into the result.
    pub async fn probe(&self, target: &TargetDescriptor) -> ProbeResult {
        let request = match self.client.get(target.url()).headers(probe_headers()).build() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(url = %target.url(), error = %e, "Failed to build probe request");
                return ProbeResult::from_error(target.url().to_string(), None, Duration::ZERO, None, &e);
            }
        };

        let request_url = request.url().to_string();
        let request_body = request
            .body()
            .and_then(|body| body.as_bytes())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned());

        tracing::debug!(url = %request_url, "Sending probe");

        let started = Instant::now();
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let elapsed = started.elapsed();
                tracing::warn!(url = %request_url, error = %e, "Probe failed: no response");
                return ProbeResult::from_error(request_url, request_body, elapsed, None, &e);
            }
        };

        let status = response.status();
        let reason = status_reason(
            status,
            response
                .extensions()
                .get::<ReasonPhrase>()
                .map(|phrase| phrase.as_bytes()),
        );
        let body = response.bytes().await;
        let elapsed = started.elapsed();

        match body {
            Ok(bytes) => {
                if status.as_u16() != crate::probe::result::SUCCESS_STATUS {
                    tracing::warn!(url = %request_url, status = %status, "Probe returned non-200 status");
                }
                ProbeResult {
                    status_code: Some(status.as_u16()),
                    elapsed_ms: truncate_millis(elapsed),
                    request_url,
                    request_body,
                    response_body: parse_body(&bytes),
                    reason,
                    failure: None,
                }
            }
            Err(e) => {
                tracing::warn!(url = %request_url, status = %status, error = %e, "Probe failed: body read error");
                ProbeResult::from_error(request_url, request_body, elapsed, Some(status.as_u16()), &e)
            }
        }
    }
}
