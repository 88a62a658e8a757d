//! Configuration types for battles

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum number of meals in the ring at once
pub const COMBATANT_CAPACITY: usize = 2;

/// Divisor applied to the score gap before it is compared to the random draw
pub const SCORE_NORMALIZATION: f64 = 100.0;

/// How long to wait on the random source by default
pub const DEFAULT_RANDOM_TIMEOUT_MS: u64 = 5_000;

/// Battle engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Time limit for one random source call, in milliseconds
    pub random_timeout_ms: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            random_timeout_ms: DEFAULT_RANDOM_TIMEOUT_MS,
        }
    }
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the random source time limit
    pub fn with_random_timeout(mut self, timeout: Duration) -> Self {
        self.random_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn random_timeout(&self) -> Duration {
        Duration::from_millis(self.random_timeout_ms)
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
