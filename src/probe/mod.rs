//! Probe executor subsystem.
//!
//! # Data Flow
//! ```text
//! TargetDescriptor (target.rs)
//!     → ProbeExecutor::probe (executor.rs): one GET, timed
//!     → ProbeResult (result.rs): status or failure, floored latency
//! ```

pub mod executor;
pub mod result;
pub mod target;

pub use executor::{ProbeExecutor, ProbeSettings};
pub use result::{ProbeFailure, ProbeResult};
pub use target::{TargetDescriptor, TargetError};
