//! Point-in-time statistics reported by the engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Counters since the engine started (or was last reset), plus current sizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Predictions that cleared the confidence threshold.
    pub predictions: u64,
    /// Speculative computations actually launched.
    pub speculative_dispatches: u64,
    /// Requests served from a speculative result.
    pub hits: u64,
    /// Requests that fell through to synchronous execution.
    pub misses: u64,
    /// Speculative computations that failed.
    pub speculative_failures: u64,
    /// Speculative results discarded unconsumed after their TTL.
    pub expirations: u64,
    /// Estimated latency saved by hits.
    pub time_saved: Duration,
    /// Live entries in the result cache.
    pub cache_size: usize,
    /// Source keys in the transition model.
    pub model_size: usize,
}

impl EngineStats {
    /// Fraction of requests served from the cache (0.0–1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Fraction of predictions that were later consumed (0.0–1.0).
    pub fn accuracy(&self) -> f64 {
        if self.predictions == 0 {
            0.0
        } else {
            (self.hits as f64 / self.predictions as f64).min(1.0)
        }
    }
}
