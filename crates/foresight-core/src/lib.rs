//! # foresight-core
//!
//! Foundation crate for the Foresight speculative execution engine.
//! Defines the action vocabulary, candidate distributions, config, errors,
//! collaborator traits, and the statistics/snapshot models.
//! Every other crate in the workspace depends on this.

pub mod action;
pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use action::{Action, PatternKey};
pub use config::ForesightConfig;
pub use errors::{ConfigError, EngineError, EngineResult, ExecutionError, SnapshotError};
pub use models::{Distribution, EngineStats, ModelSnapshot, Prediction, ShutdownReport};
pub use traits::{Perturbation, TaskExecutor};
