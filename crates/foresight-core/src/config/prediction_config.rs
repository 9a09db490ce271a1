use serde::{Deserialize, Serialize};

use super::defaults;

/// Prediction subsystem configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Minimum merged weight a candidate needs to be speculated. Range (0, 1].
    pub confidence_threshold: f64,
    /// Scale applied to pattern-key successors before merging. Range [0, 1).
    pub pattern_confidence: f64,
    /// Half-width of the uniform exploration noise. 0 disables noise.
    pub perturbation_amplitude: f64,
    /// Seed for the exploration noise. `None` seeds from entropy.
    pub perturbation_seed: Option<u64>,
    /// How many candidates above the threshold to speculate per observation.
    pub max_candidates: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: defaults::DEFAULT_CONFIDENCE_THRESHOLD,
            pattern_confidence: defaults::DEFAULT_PATTERN_CONFIDENCE,
            perturbation_amplitude: defaults::DEFAULT_PERTURBATION_AMPLITUDE,
            perturbation_seed: None,
            max_candidates: defaults::DEFAULT_MAX_CANDIDATES,
        }
    }
}
