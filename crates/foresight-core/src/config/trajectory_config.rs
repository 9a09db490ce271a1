use serde::{Deserialize, Serialize};

use super::defaults;

/// Trajectory window configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// Number of recent actions kept. Must be at least 1.
    pub capacity: usize,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::DEFAULT_TRAJECTORY_CAPACITY,
        }
    }
}
