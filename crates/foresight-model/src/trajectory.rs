//! Bounded window of the most recently observed actions.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use foresight_core::{Action, PatternKey};

/// Ordered, bounded history of observed actions. Oldest entries are
/// evicted once `capacity` is reached.
#[derive(Debug)]
pub struct TrajectoryTracker {
    window: Mutex<VecDeque<Action>>,
    capacity: usize,
}

impl TrajectoryTracker {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append `action` and return the pattern key formed by the two most
    /// recent entries, computed atomically with the append.
    pub fn push(&self, action: Action) -> Option<PatternKey> {
        self.advance(action).1
    }

    /// Append `action`, returning the action it follows and the new pattern
    /// key. Both are read under the same lock as the append, so concurrent
    /// callers each see their true predecessor.
    pub fn advance(&self, action: Action) -> (Option<Action>, Option<PatternKey>) {
        let mut window = self.lock();
        let previous = window.back().cloned();
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(action);
        (previous, pattern_of(&window))
    }

    /// Pattern key of the current window, if it holds at least two actions.
    pub fn pattern_key(&self) -> Option<PatternKey> {
        pattern_of(&self.lock())
    }

    /// Most recently observed action.
    pub fn last(&self) -> Option<Action> {
        self.lock().back().cloned()
    }

    /// Window contents, most recent first.
    pub fn recent(&self) -> Vec<Action> {
        self.lock().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Action>> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn pattern_of(window: &VecDeque<Action>) -> Option<PatternKey> {
    let len = window.len();
    if len < 2 {
        return None;
    }
    Some(PatternKey::new(&window[len - 2], &window[len - 1]))
}
