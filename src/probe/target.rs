//! Target descriptor: the immutable input to one invocation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a target descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetError {
    /// A required field was empty or whitespace.
    #[error("target field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// The service to probe, as handed over by the scheduler trigger.
///
/// Fields are private so a descriptor can only exist in a validated state.
/// Deserialization goes through the same checks as [`TargetDescriptor::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTarget")]
pub struct TargetDescriptor {
    name: String,
    url: String,
    environment: String,
}

#[derive(Deserialize)]
struct RawTarget {
    name: String,
    url: String,
    environment: String,
}

impl TryFrom<RawTarget> for TargetDescriptor {
    type Error = TargetError;

    fn try_from(raw: RawTarget) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.url, raw.environment)
    }
}

impl TargetDescriptor {
    /// Build a descriptor, rejecting empty fields.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<Self, TargetError> {
        let descriptor = Self {
            name: name.into(),
            url: url.into(),
            environment: environment.into(),
        };

        if descriptor.name.trim().is_empty() {
            return Err(TargetError::EmptyField("name"));
        }
        if descriptor.url.trim().is_empty() {
            return Err(TargetError::EmptyField("url"));
        }
        if descriptor.environment.trim().is_empty() {
            return Err(TargetError::EmptyField("environment"));
        }

        Ok(descriptor)
    }

    /// Identifier of the probed service (e.g. "coinbase").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint to probe.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deployment environment tag (e.g. "prod").
    pub fn environment(&self) -> &str {
        &self.environment
    }
}

impl std::fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.environment, self.name, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_complete_descriptor() {
        let target = TargetDescriptor::new("kraken", "https://api.kraken.com/0/public/Time", "prod").unwrap();
        assert_eq!(target.name(), "kraken");
        assert_eq!(target.url(), "https://api.kraken.com/0/public/Time");
        assert_eq!(target.environment(), "prod");
    }

    #[test]
    fn test_new_rejects_empty_fields() {
        assert_eq!(
            TargetDescriptor::new("", "https://x", "prod"),
            Err(TargetError::EmptyField("name"))
        );
        assert_eq!(
            TargetDescriptor::new("kraken", "  ", "prod"),
            Err(TargetError::EmptyField("url"))
        );
        assert_eq!(
            TargetDescriptor::new("kraken", "https://x", ""),
            Err(TargetError::EmptyField("environment"))
        );
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let ok: TargetDescriptor = serde_json::from_str(
            r#"{"name": "gemini", "url": "https://api.gemini.com/v1/symbols", "environment": "devo"}"#,
        )
        .unwrap();
        assert_eq!(ok.name(), "gemini");

        let err = serde_json::from_str::<TargetDescriptor>(
            r#"{"name": "", "url": "https://api.gemini.com/v1/symbols", "environment": "devo"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("`name` must not be empty"));

        let missing = serde_json::from_str::<TargetDescriptor>(r#"{"name": "gemini"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_serialize_keeps_field_order() {
        let target = TargetDescriptor::new("binance", "https://data-api.binance.vision/api/v3/time", "prod").unwrap();
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(
            json,
            r#"{"name":"binance","url":"https://data-api.binance.vision/api/v3/time","environment":"prod"}"#
        );
    }
}
