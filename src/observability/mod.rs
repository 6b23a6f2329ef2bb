//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every invocation produces:
//!     → logging.rs (tracing spans/events on stderr)
//!     → metrics.rs (self-metrics counters)
//!
//! Consumers:
//!     → Log aggregation (stderr, JSON or pretty)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! Diagnostic records are not tracing events; they go through
//! `emitter::LogSink` on stdout.

pub mod logging;
pub mod metrics;
