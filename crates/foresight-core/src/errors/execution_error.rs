//! Task execution errors.

use crate::action::Action;

/// Failure of a [`TaskExecutor`](crate::traits::TaskExecutor) computation.
///
/// Returned unchanged from `handle` when the synchronous path fails.
/// Speculative failures are recorded as a failed cache entry and never
/// reach the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("execution of {action} failed: {reason}")]
    Failed { action: Action, reason: String },
}

impl ExecutionError {
    pub fn failed(action: &Action, reason: impl Into<String>) -> Self {
        Self::Failed {
            action: action.clone(),
            reason: reason.into(),
        }
    }

    /// The action whose execution failed.
    pub fn action(&self) -> &Action {
        match self {
            Self::Failed { action, .. } => action,
        }
    }
}
