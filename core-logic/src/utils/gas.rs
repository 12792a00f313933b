//! # Core Logic - Gas Configuration
//!
//! Chain-agnostic gas settings. Chain crates turn these into provider calls;
//! this module only holds the ceiling, the poll cadence and unit helpers.

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the gas-price gate
#[derive(Debug, Clone, PartialEq)]
pub struct GasConfig {
    pub max_gwei: f64,
    pub poll_interval: Duration,
    pub price_bump_percent: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            max_gwei: 20.0,
            poll_interval: Duration::from_secs(10),
            price_bump_percent: 105,
        }
    }
}

impl GasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_gwei(mut self, max_gwei: f64) -> Self {
        self.max_gwei = max_gwei;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn max_gwei(&self) -> f64 {
        self.max_gwei
    }

    /// Ceiling in wei, rounded down.
    pub fn max_wei(&self) -> u128 {
        gwei_to_wei(self.max_gwei)
    }
}

/// Convert gwei to wei, truncating sub-wei fractions
pub fn gwei_to_wei(gwei: f64) -> u128 {
    if gwei <= 0.0 {
        return 0;
    }
    (gwei * 1e9) as u128
}

/// Convert wei to gwei for display
pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / 1e9
}

/// Deserialize helper for GasConfig from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct GasConfigToml {
    pub max_gwei: f64,
    pub poll_interval_secs: Option<u64>,
    pub price_bump_percent: Option<u64>,
}

impl From<GasConfigToml> for GasConfig {
    fn from(toml: GasConfigToml) -> Self {
        let defaults = GasConfig::default();
        Self {
            max_gwei: toml.max_gwei,
            poll_interval: toml
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            price_bump_percent: toml
                .price_bump_percent
                .unwrap_or(defaults.price_bump_percent),
        }
    }
}
