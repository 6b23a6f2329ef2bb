//! Compiled-in set of probed exchanges, environments and regions.
//!
//! The list is fixed at build time. Adding a target means editing this file.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::probe::TargetDescriptor;

/// Deployment environment of a probe fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Devo,
    #[default]
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Devo, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Devo => "devo",
            Environment::Prod => "prod",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown environment `{0}` (expected devo or prod)")]
pub struct UnknownEnvironment(pub String);

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "devo" => Ok(Environment::Devo),
            "prod" => Ok(Environment::Prod),
            _ => Err(UnknownEnvironment(s.to_string())),
        }
    }
}

/// Regions the probe fleet is deployed to.
pub const REGIONS: [&str; 8] = [
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-central-1",
    "ap-southeast-1",
    "ap-northeast-1",
];

/// (name, devo URL, prod URL)
const EXCHANGES: [(&str, &str, &str); 4] = [
    (
        "coinbase",
        "https://api-public.sandbox.exchange.coinbase.com/time",
        "https://api.exchange.coinbase.com/time",
    ),
    (
        "kraken",
        "https://api.kraken.com/0/public/Time",
        "https://api.kraken.com/0/public/Time",
    ),
    (
        "gemini",
        "https://api.sandbox.gemini.com/v1/symbols",
        "https://api.gemini.com/v1/symbols",
    ),
    (
        "binance",
        "https://data-api.binance.vision/api/v3/time",
        "https://data-api.binance.vision/api/v3/time",
    ),
];

/// Whether `region` is one the fleet is deployed to.
pub fn is_known_region(region: &str) -> bool {
    REGIONS.contains(&region)
}

/// Descriptors for every exchange in `environment`, in catalog order.
pub fn targets_for(environment: Environment) -> Vec<TargetDescriptor> {
    EXCHANGES
        .iter()
        .filter_map(|(name, devo, prod)| {
            let url = match environment {
                Environment::Devo => devo,
                Environment::Prod => prod,
            };
            // Catalog entries are non-empty literals.
            TargetDescriptor::new(*name, *url, environment.as_str()).ok()
        })
        .collect()
}
