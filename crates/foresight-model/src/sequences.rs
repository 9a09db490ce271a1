//! Observed transition counts and per-action frequency.
//!
//! Unlike the [`TransitionModel`](crate::TransitionModel), which is only
//! reinforced on misses, the log counts every observation. It backs the
//! "top sequences" and "trending action" diagnostics.

use dashmap::DashMap;
use foresight_core::Action;
use serde::{Deserialize, Serialize};

/// A `from → to` pair and how often it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedSequence {
    pub from: Action,
    pub to: Action,
    pub count: u64,
}

#[derive(Debug, Default)]
pub struct SequenceLog {
    transitions: DashMap<(Action, Action), u64>,
    frequency: DashMap<Action, u64>,
}

impl SequenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `current`, and `previous → current` when a predecessor exists.
    pub fn record(&self, previous: Option<&Action>, current: &Action) {
        *self.frequency.entry(current.clone()).or_insert(0) += 1;
        if let Some(previous) = previous {
            *self
                .transitions
                .entry((previous.clone(), current.clone()))
                .or_insert(0) += 1;
        }
    }

    /// The `limit` most frequent transitions, ties in lexical order.
    pub fn top_sequences(&self, limit: usize) -> Vec<LearnedSequence> {
        let mut sequences: Vec<LearnedSequence> = self
            .transitions
            .iter()
            .map(|entry| {
                let (from, to) = entry.key();
                LearnedSequence {
                    from: from.clone(),
                    to: to.clone(),
                    count: *entry.value(),
                }
            })
            .collect();
        sequences.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.from.cmp(&b.from))
                .then_with(|| a.to.cmp(&b.to))
        });
        sequences.truncate(limit);
        sequences
    }

    /// Most frequently observed action and its count.
    pub fn trending(&self) -> Option<(Action, u64)> {
        self.frequency
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .min_by(|(a_action, a_count), (b_action, b_count)| {
                b_count.cmp(a_count).then_with(|| a_action.cmp(b_action))
            })
    }

    pub fn frequency(&self, action: &Action) -> u64 {
        self.frequency.get(action).map(|c| *c).unwrap_or(0)
    }

    pub fn clear(&self) {
        self.transitions.clear();
        self.frequency.clear();
    }
}
