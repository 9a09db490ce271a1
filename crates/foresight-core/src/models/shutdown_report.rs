use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the worker pool ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ShutdownOutcome {
    /// Every speculative computation finished within the grace period.
    Drained,
    /// The grace period elapsed; `cancelled` computations were aborted.
    TimedOut { cancelled: usize },
}

/// Result of draining the engine on shutdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutdownReport {
    pub outcome: ShutdownOutcome,
    /// Speculative results discarded from the cache.
    pub discarded_results: usize,
    pub elapsed: Duration,
}

impl ShutdownReport {
    /// True if nothing had to be force-cancelled.
    pub fn is_clean(&self) -> bool {
        self.outcome == ShutdownOutcome::Drained
    }

    /// Number of computations aborted after the grace period.
    pub fn cancelled(&self) -> usize {
        match self.outcome {
            ShutdownOutcome::Drained => 0,
            ShutdownOutcome::TimedOut { cancelled } => cancelled,
        }
    }
}
