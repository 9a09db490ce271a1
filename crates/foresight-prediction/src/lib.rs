//! # foresight-prediction
//!
//! Turns the learned model into speculation candidates.
//!
//! | Step | Source |
//! |------|--------|
//! | Direct | Successors of the just-observed action |
//! | Pattern | Successors of the two-step key `previous->current`, scaled by `pattern_confidence` |
//! | Merge | Additive per destination, so agreement between lookups boosts a candidate |
//! | Perturb | Exploration noise on the merged copy |
//! | Select | Candidates at or above `confidence_threshold`, best first |

pub mod engine;

pub use engine::PredictionEngine;
