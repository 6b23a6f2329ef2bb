//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! ping.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PingConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; running without a file probes the prod catalog
//! - Validation separates syntactic (serde) from semantic checks
//! - Nothing here reaches into a single invocation's input

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BackendKind, DeadLetterConfig, LogFormat, MetricsConfig, ObservabilityConfig, PingConfig,
    ProbeConfig, TargetConfig,
};
pub use validation::{validate_config, validate_one_shot, ValidationError};
