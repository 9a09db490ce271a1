//! Error handling for Foresight.
//! One error enum per concern, `thiserror` only.

pub mod config_error;
pub mod engine_error;
pub mod execution_error;
pub mod snapshot_error;

pub use config_error::ConfigError;
pub use engine_error::{EngineError, EngineResult};
pub use execution_error::ExecutionError;
pub use snapshot_error::SnapshotError;
