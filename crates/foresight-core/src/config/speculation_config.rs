use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Speculative execution and result cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeculationConfig {
    /// Lifetime of an unconsumed speculative result, in milliseconds.
    pub ttl_ms: u64,
    /// Longest a real request waits on an in-flight speculation, in milliseconds.
    pub in_flight_wait_ms: u64,
    /// Maximum speculative computations running at once.
    pub max_workers: usize,
    /// Grace period for draining workers on shutdown, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl SpeculationConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn in_flight_wait(&self) -> Duration {
        Duration::from_millis(self.in_flight_wait_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for SpeculationConfig {
    fn default() -> Self {
        Self {
            ttl_ms: defaults::DEFAULT_TTL_MS,
            in_flight_wait_ms: defaults::DEFAULT_IN_FLIGHT_WAIT_MS,
            max_workers: defaults::DEFAULT_MAX_WORKERS,
            shutdown_grace_ms: defaults::DEFAULT_SHUTDOWN_GRACE_MS,
        }
    }
}
