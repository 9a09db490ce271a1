//! # foresight-observability
//!
//! Structured tracing for the speculation lifecycle (subscriber setup,
//! named events, spans) and the lock-free counters behind
//! [`EngineStats`](foresight_core::EngineStats).

pub mod metrics;
pub mod tracing_setup;

pub use metrics::SpeculationMetrics;
pub use tracing_setup::init_tracing;
