//! Top-level Foresight configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    LearningConfig, ObservabilityConfig, PredictionConfig, SpeculationConfig, TrajectoryConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`FORESIGHT_*`)
/// 2. TOML file passed to [`ForesightConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForesightConfig {
    pub prediction: PredictionConfig,
    pub speculation: SpeculationConfig,
    pub learning: LearningConfig,
    pub trajectory: TrajectoryConfig,
    pub observability: ObservabilityConfig,
}

impl ForesightConfig {
    /// Load configuration from an optional TOML file, then apply `FORESIGHT_*`
    /// environment overrides and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string. Missing keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// Unparseable values are ignored and the previous value is kept.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var::<f64, _>(&lookup, "FORESIGHT_CONFIDENCE_THRESHOLD") {
            self.prediction.confidence_threshold = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "FORESIGHT_PATTERN_CONFIDENCE") {
            self.prediction.pattern_confidence = v;
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "FORESIGHT_PERTURBATION_SEED") {
            self.prediction.perturbation_seed = Some(v);
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "FORESIGHT_TTL_MS") {
            self.speculation.ttl_ms = v;
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "FORESIGHT_IN_FLIGHT_WAIT_MS") {
            self.speculation.in_flight_wait_ms = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "FORESIGHT_MAX_WORKERS") {
            self.speculation.max_workers = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "FORESIGHT_LEARNING_RATE") {
            self.learning.learning_rate = v;
        }
        if let Some(v) = parse_var::<bool, _>(&lookup, "FORESIGHT_REINFORCE_ON_HIT") {
            self.learning.reinforce_on_hit = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "FORESIGHT_TRAJECTORY_CAPACITY") {
            self.trajectory.capacity = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.prediction;
        if !(p.confidence_threshold > 0.0 && p.confidence_threshold <= 1.0) {
            return Err(invalid(
                "prediction.confidence_threshold",
                "must be greater than 0.0 and at most 1.0",
            ));
        }
        if !(0.0..1.0).contains(&p.pattern_confidence) {
            return Err(invalid(
                "prediction.pattern_confidence",
                "must be at least 0.0 and below 1.0",
            ));
        }
        if !(0.0..=1.0).contains(&p.perturbation_amplitude) {
            return Err(invalid(
                "prediction.perturbation_amplitude",
                "must be between 0.0 and 1.0",
            ));
        }
        if p.max_candidates == 0 {
            return Err(invalid("prediction.max_candidates", "must be greater than 0"));
        }

        let s = &self.speculation;
        if s.ttl_ms == 0 {
            return Err(invalid("speculation.ttl_ms", "must be greater than 0"));
        }
        if s.in_flight_wait_ms == 0 {
            return Err(invalid("speculation.in_flight_wait_ms", "must be greater than 0"));
        }
        if s.max_workers == 0 {
            return Err(invalid("speculation.max_workers", "must be greater than 0"));
        }

        let rate = self.learning.learning_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(invalid(
                "learning.learning_rate",
                "must be greater than 0.0 and at most 1.0",
            ));
        }

        if self.trajectory.capacity == 0 {
            return Err(invalid("trajectory.capacity", "must be greater than 0"));
        }
        Ok(())
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|raw| raw.trim().parse::<T>().ok())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
