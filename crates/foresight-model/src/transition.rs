//! Learned successor weights with per-source locking via DashMap.
//!
//! Each source action owns an insertion-ordered [`Distribution`] of
//! successors. Reinforcing one source only locks that source's shard, so
//! prediction on unrelated actions proceeds concurrently.

use dashmap::DashMap;
use foresight_core::errors::SnapshotError;
use foresight_core::models::{Distribution, ModelSnapshot, TransitionRecord};
use foresight_core::Action;
use tracing::debug;

/// Edges decayed below this weight are pruned.
const PRUNE_EPSILON: f64 = 1e-6;

/// Thread-safe transition model.
#[derive(Debug, Default)]
pub struct TransitionModel {
    edges: DashMap<Action, Distribution>,
}

impl TransitionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increase the weight of `from → to` by `delta`, clamped to `[0, 1]`.
    ///
    /// Creates the edge if absent and returns the new weight. Non-finite
    /// deltas leave the model untouched.
    pub fn reinforce(&self, from: &Action, to: &Action, delta: f64) -> f64 {
        if !delta.is_finite() {
            return self.weight(from, to).unwrap_or(0.0);
        }
        let mut successors = self.edges.entry(from.clone()).or_default();
        let updated = (successors.weight(to.as_str()).unwrap_or(0.0) + delta).clamp(0.0, 1.0);
        successors.set(to.clone(), updated);
        updated
    }

    /// Current successor distribution of `from`; empty if unknown.
    pub fn predict(&self, from: &Action) -> Distribution {
        self.edges
            .get(from)
            .map(|successors| successors.clone())
            .unwrap_or_default()
    }

    /// Weight of a single edge.
    pub fn weight(&self, from: &Action, to: &Action) -> Option<f64> {
        self.edges
            .get(from)
            .and_then(|successors| successors.weight(to.as_str()))
    }

    /// Multiply every weight by `factor` (clamped to `[0, 1]`), pruning
    /// edges that become negligible. Returns the number of pruned edges.
    pub fn decay(&self, factor: f64) -> usize {
        let factor = if factor.is_nan() { 1.0 } else { factor.clamp(0.0, 1.0) };
        let mut pruned = 0;
        for mut successors in self.edges.iter_mut() {
            successors.map_weights(|w| w * factor);
            let before = successors.len();
            successors.retain(|c| c.weight >= PRUNE_EPSILON);
            pruned += before - successors.len();
        }
        self.edges.retain(|_, successors| !successors.is_empty());
        debug!(factor, pruned, "transition model decayed");
        pruned
    }

    /// Number of source actions with at least one successor.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of `from → to` edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|entry| entry.value().len()).sum()
    }

    /// All source actions, sorted.
    pub fn sources(&self) -> Vec<Action> {
        let mut sources: Vec<Action> = self.edges.iter().map(|e| e.key().clone()).collect();
        sources.sort();
        sources
    }

    /// Export every edge. Sources are sorted; successors keep their order.
    pub fn export(&self) -> ModelSnapshot {
        let mut transitions = Vec::with_capacity(self.edge_count());
        for from in self.sources() {
            if let Some(successors) = self.edges.get(&from) {
                transitions.extend(successors.iter().map(|c| TransitionRecord {
                    from: from.clone(),
                    to: c.action.clone(),
                    weight: c.weight,
                }));
            }
        }
        ModelSnapshot::new(transitions)
    }

    /// Overwrite the edges listed in `snapshot`, keeping all others.
    ///
    /// Returns the number of edges written.
    pub fn import(&self, snapshot: &ModelSnapshot) -> Result<usize, SnapshotError> {
        snapshot.validate()?;
        for record in &snapshot.transitions {
            self.edges
                .entry(record.from.clone())
                .or_default()
                .set(record.to.clone(), record.weight);
        }
        Ok(snapshot.len())
    }

    /// Clear the model and load `snapshot` in its place.
    pub fn replace(&self, snapshot: &ModelSnapshot) -> Result<usize, SnapshotError> {
        snapshot.validate()?;
        self.clear();
        self.import(snapshot)
    }

    pub fn clear(&self) {
        self.edges.clear();
    }
}
