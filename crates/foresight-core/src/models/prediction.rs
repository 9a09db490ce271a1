use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Which lookups contributed to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// Only the direct successor distribution of the observed action.
    Direct,
    /// Only the two-step pattern distribution.
    Pattern,
    /// Both lookups agreed on the candidate.
    Combined,
}

/// A successor action selected for speculative execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The action expected to be requested next.
    pub action: Action,
    /// Merged, perturbed weight that cleared the threshold.
    pub confidence: f64,
    pub source: PredictionSource,
}
