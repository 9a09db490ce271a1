//! Engine construction and lifecycle errors.

use super::{ConfigError, SnapshotError};

/// Errors surfaced by the engine itself (never by task execution).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("no tokio runtime available; construct the engine inside a runtime or pass a handle")]
    NoRuntime,
}

pub type EngineResult<T> = Result<T, EngineError>;
