//! Simulation configuration.
//!
//! One explicit struct constructed at startup and threaded into the
//! orchestration layer; the core components themselves take only the
//! scalars they need (commission, execution delay, bar cap).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Scalars consumed by a simulation run. Every field has a default, so a
/// partial TOML file (or none at all) is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Starting account balance. Informational only — the broker does not
    /// enforce it as a margin constraint.
    pub initial_balance: f64,
    pub commission_per_order: f64,
    /// Minimum dwell (simulated milliseconds) before a freshly placed
    /// order becomes eligible to fill.
    pub order_execution_delay_ms: i64,
    /// Cap on retained bars per period; oldest bars are evicted first.
    pub max_bars: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            commission_per_order: 0.0,
            order_execution_delay_ms: 0,
            max_bars: 250,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}
