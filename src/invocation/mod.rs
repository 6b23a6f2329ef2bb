//! Invocation pipeline.
//!
//! # Data Flow
//! ```text
//! scheduler trigger / CLI
//!     → handler.rs (validate input, scope clients)
//!     → probe::ProbeExecutor
//!     → emitter::MetricEmitter
//!     → InvocationReport | InvocationError
//! ```
//!
//! # Design Decisions
//! - No state survives an invocation
//! - Every invocation gets its own span with an `invocation_id`

pub mod handler;
pub mod state;

pub use handler::{Handler, InvocationError, InvocationReport};
pub use state::InvocationState;
