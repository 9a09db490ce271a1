//! # foresight-model
//!
//! The learned state behind prediction:
//!
//! | Module | Holds |
//! |--------|-------|
//! | `transition` | Weighted `from → to` edges, reinforced online |
//! | `trajectory` | Bounded window of recently observed actions |
//! | `perturbation` | Seedable exploration noise over candidate distributions |
//! | `sequences` | Observed transition counts and action frequency |
//! | `seeds` | Built-in workflow table for pre-training |
//!
//! Every structure is owned by an engine instance; nothing here is global.

pub mod perturbation;
pub mod seeds;
pub mod sequences;
pub mod trajectory;
pub mod transition;

pub use perturbation::{NoisePerturbation, NullPerturbation};
pub use sequences::{LearnedSequence, SequenceLog};
pub use trajectory::TrajectoryTracker;
pub use transition::TransitionModel;
