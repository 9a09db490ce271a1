//! Structured log events for the speculation lifecycle.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

use std::time::Duration;

/// A candidate cleared the confidence threshold.
pub fn prediction_made(observed: &str, predicted: &str, confidence: f64) {
    tracing::debug!(
        event = "prediction_made",
        observed = %observed,
        predicted = %predicted,
        confidence = confidence,
        "prediction made"
    );
}

/// A speculative computation was dispatched.
pub fn speculation_launched(action: &str, entry_id: u64) {
    tracing::debug!(
        event = "speculation_launched",
        action = %action,
        entry_id = entry_id,
        "speculation launched"
    );
}

/// A speculative computation failed. Its entry now misses.
pub fn speculation_failed(action: &str, reason: &str) {
    tracing::warn!(
        event = "speculation_failed",
        action = %action,
        reason = %reason,
        "speculative execution failed"
    );
}

/// A speculative result reached its TTL unconsumed.
pub fn speculation_expired(action: &str, entry_id: u64) {
    tracing::debug!(
        event = "speculation_expired",
        action = %action,
        entry_id = entry_id,
        "speculative result expired"
    );
}

/// A request was served from a speculative result.
pub fn cache_hit(action: &str, saved: Duration, waited: bool) {
    tracing::info!(
        event = "cache_hit",
        action = %action,
        saved_ms = saved.as_millis() as u64,
        waited = waited,
        "served from speculation"
    );
}

/// A request fell through to synchronous execution.
pub fn cache_miss(action: &str, reason: &str) {
    tracing::info!(
        event = "cache_miss",
        action = %action,
        reason = %reason,
        "speculation miss"
    );
}

/// A miss reinforced `from → to`.
pub fn transition_learned(from: &str, to: &str, weight: f64) {
    tracing::debug!(
        event = "transition_learned",
        from = %from,
        to = %to,
        weight = weight,
        "transition learned"
    );
}

/// Shutdown finished.
pub fn shutdown_completed(cancelled: usize, discarded: usize, elapsed: Duration) {
    tracing::info!(
        event = "shutdown_completed",
        cancelled = cancelled,
        discarded = discarded,
        elapsed_ms = elapsed.as_millis() as u64,
        "engine shut down"
    );
}
