//! Exchange latency probe library.
//!
//! Scheduled probe → latency metric pipeline for cryptocurrency exchange APIs.

pub mod catalog;
pub mod config;
pub mod emitter;
pub mod invocation;
pub mod lifecycle;
pub mod observability;
pub mod probe;

pub use config::PingConfig;
pub use invocation::{Handler, InvocationError, InvocationReport};
pub use lifecycle::{Scheduler, Shutdown};
pub use probe::TargetDescriptor;
