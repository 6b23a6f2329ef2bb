//! Metric emitter subsystem.
//!
//! # Data Flow
//! ```text
//! ProbeResult + TargetDescriptor
//!     → emit.rs
//!         → observation.rs (only for status 200)
//!         → backend.rs / http_backend.rs (one put_metric call)
//!         → log_record.rs → sink.rs (always, after the metric attempt)
//! ```
//!
//! # Design Decisions
//! - A backend failure is reported, never allowed to skip the log record
//! - Failed probes stay out of the latency series but remain in the log

pub mod backend;
pub mod emit;
pub mod http_backend;
pub mod log_record;
pub mod observation;
pub mod sink;

pub use backend::{BackendFactory, ConfiguredBackend, MemoryBackend, MetricsBackend, MetricsError, PrometheusBackend};
pub use emit::{EmitError, EmitReport, MetricEmitter, MetricStatus};
pub use http_backend::HttpBackend;
pub use log_record::LogRecord;
pub use observation::{Dimension, MetricObservation, Unit};
pub use sink::{LogSink, MemorySink, StdoutSink};
