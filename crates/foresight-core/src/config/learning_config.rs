use serde::{Deserialize, Serialize};

use super::defaults;

/// Online learning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Weight added to `previous → requested` on every miss. Range (0, 1].
    pub learning_rate: f64,
    /// Also reinforce the transition when a request is served from the cache.
    pub reinforce_on_hit: bool,
    /// Pre-train the model with the built-in workflow table at construction.
    pub seed_default_workflows: bool,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            reinforce_on_hit: defaults::DEFAULT_REINFORCE_ON_HIT,
            seed_default_workflows: defaults::DEFAULT_SEED_WORKFLOWS,
        }
    }
}
