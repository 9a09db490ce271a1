//! Configuration system for Foresight.
//! TOML-based, 3-layer resolution: env > file > compiled defaults.

pub mod defaults;
pub mod foresight_config;
pub mod learning_config;
pub mod observability_config;
pub mod prediction_config;
pub mod speculation_config;
pub mod trajectory_config;

pub use foresight_config::ForesightConfig;
pub use learning_config::LearningConfig;
pub use observability_config::ObservabilityConfig;
pub use prediction_config::PredictionConfig;
pub use speculation_config::SpeculationConfig;
pub use trajectory_config::TrajectoryConfig;
