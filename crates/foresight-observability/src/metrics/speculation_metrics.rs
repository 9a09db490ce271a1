//! Predictions, dispatches, hits, misses, failures, expirations, time saved.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use foresight_core::EngineStats;

/// Lock-free counters updated from the observe, handle and worker paths.
#[derive(Debug, Default)]
pub struct SpeculationMetrics {
    predictions: AtomicU64,
    dispatches: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
    expirations: AtomicU64,
    time_saved_us: AtomicU64,
}

impl SpeculationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_prediction(&self) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a hit and the latency it saved.
    pub fn record_hit(&self, saved: Duration) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(saved.as_micros()).unwrap_or(u64::MAX);
        self.time_saved_us.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expiration(&self) {
        self.record_expirations(1);
    }

    pub fn record_expirations(&self, count: u64) {
        self.expirations.fetch_add(count, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters combined with current sizes.
    pub fn snapshot(&self, cache_size: usize, model_size: usize) -> EngineStats {
        EngineStats {
            predictions: self.predictions.load(Ordering::Relaxed),
            speculative_dispatches: self.dispatches.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            speculative_failures: self.failures.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            time_saved: Duration::from_micros(self.time_saved_us.load(Ordering::Relaxed)),
            cache_size,
            model_size,
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counter in [
            &self.predictions,
            &self.dispatches,
            &self.hits,
            &self.misses,
            &self.failures,
            &self.expirations,
            &self.time_saved_us,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
