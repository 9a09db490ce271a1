//! PredictionEngine: merges direct and pattern lookups, perturbs, thresholds.

use std::sync::Arc;

use foresight_core::config::PredictionConfig;
use foresight_core::models::{Distribution, Prediction, PredictionSource};
use foresight_core::{Action, PatternKey, Perturbation};
use foresight_model::perturbation;
use foresight_model::TransitionModel;
use tracing::trace;

/// Stateless over the model: every call reads the current weights.
pub struct PredictionEngine {
    model: Arc<TransitionModel>,
    perturbation: Arc<dyn Perturbation>,
    config: PredictionConfig,
}

impl PredictionEngine {
    /// Perturbation is derived from `config`.
    pub fn new(model: Arc<TransitionModel>, config: PredictionConfig) -> Self {
        let perturbation = perturbation::from_config(&config);
        Self::with_perturbation(model, perturbation, config)
    }

    pub fn with_perturbation(
        model: Arc<TransitionModel>,
        perturbation: Arc<dyn Perturbation>,
        config: PredictionConfig,
    ) -> Self {
        Self {
            model,
            perturbation,
            config,
        }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn model(&self) -> &Arc<TransitionModel> {
        &self.model
    }

    /// Merged, unperturbed distribution for `action` given the optional
    /// two-step pattern.
    pub fn distribution(&self, action: &Action, pattern: Option<&PatternKey>) -> Distribution {
        let (direct, by_pattern) = self.sources(action, pattern);
        self.merge(&direct, &by_pattern)
    }

    /// Up to `max_candidates` predictions clearing the confidence threshold,
    /// best first. Empty when nothing clears it.
    pub fn candidates(&self, action: &Action, pattern: Option<&PatternKey>) -> Vec<Prediction> {
        self.select(action, pattern, self.config.max_candidates)
    }

    /// The single best prediction, if any clears the threshold.
    pub fn predict(&self, action: &Action, pattern: Option<&PatternKey>) -> Option<Prediction> {
        self.select(action, pattern, 1).into_iter().next()
    }

    fn select(
        &self,
        action: &Action,
        pattern: Option<&PatternKey>,
        limit: usize,
    ) -> Vec<Prediction> {
        let (direct, by_pattern) = self.sources(action, pattern);
        let merged = self.merge(&direct, &by_pattern);
        if merged.is_empty() {
            return Vec::new();
        }

        let perturbed = self.perturbation.perturb(merged);
        let selected: Vec<Prediction> = perturbed
            .above(self.config.confidence_threshold, limit)
            .into_iter()
            .map(|candidate| {
                let in_direct = direct.weight(candidate.action.as_str()).is_some();
                let in_pattern = by_pattern.weight(candidate.action.as_str()).is_some();
                let source = match (in_direct, in_pattern) {
                    (true, true) => PredictionSource::Combined,
                    (false, true) => PredictionSource::Pattern,
                    _ => PredictionSource::Direct,
                };
                Prediction {
                    action: candidate.action,
                    confidence: candidate.weight,
                    source,
                }
            })
            .collect();

        trace!(
            action = %action,
            pattern = pattern.map(|p| p.to_string()).as_deref().unwrap_or("-"),
            selected = selected.len(),
            "candidates evaluated"
        );
        selected
    }

    /// Direct successors of `action` and successors of the pattern edge.
    fn sources(
        &self,
        action: &Action,
        pattern: Option<&PatternKey>,
    ) -> (Distribution, Distribution) {
        let direct = self.model.predict(action);
        let by_pattern = pattern
            .map(|p| self.model.predict(&p.as_action()))
            .unwrap_or_default();
        (direct, by_pattern)
    }

    fn merge(&self, direct: &Distribution, by_pattern: &Distribution) -> Distribution {
        let mut merged = direct.clone();
        merged.merge_scaled(by_pattern, self.config.pattern_confidence);
        merged
    }
}
