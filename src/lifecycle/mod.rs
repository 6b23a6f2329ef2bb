//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler (scheduler.rs):
//!     every 5 minutes per target → invocation::Handler
//!     → on error → dead_letter.rs
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → stop firing → drain in-flight → exit
//! ```
//!
//! # Design Decisions
//! - One ticker per target, so a slow exchange never delays another
//! - No retries; dead letters are for inspection

pub mod dead_letter;
pub mod scheduler;
pub mod shutdown;
pub mod signals;

pub use dead_letter::{DeadLetter, DeadLetterQueue};
pub use scheduler::{Scheduler, PING_INTERVAL};
pub use shutdown::Shutdown;
