//! Engine counters.

pub mod speculation_metrics;

pub use speculation_metrics::SpeculationMetrics;
