pub mod distribution;
pub mod engine_stats;
pub mod model_snapshot;
pub mod prediction;
pub mod shutdown_report;

pub use distribution::{Candidate, Distribution};
pub use engine_stats::EngineStats;
pub use model_snapshot::{ModelSnapshot, TransitionRecord, SNAPSHOT_VERSION};
pub use prediction::{Prediction, PredictionSource};
pub use shutdown_report::{ShutdownOutcome, ShutdownReport};
