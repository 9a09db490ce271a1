//! Candidate distributions over successor actions.
//!
//! A [`Distribution`] keeps candidates in first-seen order. Weights need not
//! sum to 1; only their relative magnitude matters. Merging is additive per
//! destination so that agreement between signals boosts a candidate.

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// One successor action and its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub action: Action,
    pub weight: f64,
}

/// Insertion-ordered mapping from successor action to weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution {
    entries: Vec<Candidate>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.entries.iter()
    }

    /// Weight of `action`, if present.
    pub fn weight(&self, action: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|c| c.action.as_str() == action)
            .map(|c| c.weight)
    }

    /// Add `weight` to `action`, appending it if not yet present.
    pub fn add(&mut self, action: Action, weight: f64) {
        match self.entries.iter_mut().find(|c| c.action == action) {
            Some(existing) => existing.weight += weight,
            None => self.entries.push(Candidate { action, weight }),
        }
    }

    /// Set the weight of `action`, appending it if not yet present.
    pub fn set(&mut self, action: Action, weight: f64) {
        match self.entries.iter_mut().find(|c| c.action == action) {
            Some(existing) => existing.weight = weight,
            None => self.entries.push(Candidate { action, weight }),
        }
    }

    /// Keep only the candidates for which `keep` returns true.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Candidate) -> bool,
    {
        self.entries.retain(keep);
    }

    /// Merge `other` into `self`, scaling each of its weights by `factor`.
    pub fn merge_scaled(&mut self, other: &Distribution, factor: f64) {
        for candidate in other.iter() {
            self.add(candidate.action.clone(), candidate.weight * factor);
        }
    }

    /// Apply `f` to every weight in place.
    pub fn map_weights<F>(&mut self, mut f: F)
    where
        F: FnMut(f64) -> f64,
    {
        for candidate in &mut self.entries {
            candidate.weight = f(candidate.weight);
        }
    }

    /// Clamp every weight into `[0, 1]`.
    pub fn clamp_unit(&mut self) {
        self.map_weights(|w| if w.is_nan() { 0.0 } else { w.clamp(0.0, 1.0) });
    }

    /// Highest-weighted candidate. The first-seen candidate wins ties.
    pub fn argmax(&self) -> Option<&Candidate> {
        let mut best: Option<&Candidate> = None;
        for candidate in &self.entries {
            match best {
                Some(b) if candidate.weight <= b.weight => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// Candidates sorted by descending weight; ties keep first-seen order.
    pub fn ranked(&self) -> Vec<Candidate> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Up to `limit` candidates whose weight is at least `threshold`, best first.
    pub fn above(&self, threshold: f64, limit: usize) -> Vec<Candidate> {
        self.ranked()
            .into_iter()
            .filter(|c| c.weight >= threshold)
            .take(limit)
            .collect()
    }
}

impl FromIterator<(Action, f64)> for Distribution {
    fn from_iter<I: IntoIterator<Item = (Action, f64)>>(iter: I) -> Self {
        let mut dist = Distribution::new();
        for (action, weight) in iter {
            dist.add(action, weight);
        }
        dist
    }
}

impl<'a> IntoIterator for &'a Distribution {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
