//! ResultCache: speculative results keyed by action.
//!
//! Each entry carries a `watch` receiver fed by its producer task. Entries
//! leave the map through exactly one of: consumption (`DashMap::remove`),
//! the TTL timer (`remove_if` on the entry id), or replacement after
//! expiry. Whoever removes the entry owns it, so a result is delivered at
//! most once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use foresight_core::Action;
use tokio::sync::watch;

/// Progress of one speculative computation.
#[derive(Debug, Clone)]
pub enum SlotState<V> {
    Pending,
    Ready { value: V, computed_in: Duration },
    Failed(String),
}

/// Externally visible state of a live entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeculationState {
    InFlight,
    Ready,
    Failed,
}

#[derive(Debug)]
struct SpeculativeEntry<V> {
    id: u64,
    deadline: Instant,
    state: watch::Receiver<SlotState<V>>,
}

impl<V> SpeculativeEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Failed, or still pending with its producer gone (a panicked task).
    fn is_failed(&self) -> bool {
        match *self.state.borrow() {
            SlotState::Failed(_) => return true,
            SlotState::Ready { .. } => return false,
            SlotState::Pending => {}
        }
        // Once closed the value is final, so a second look is authoritative.
        self.state.has_changed().is_err() && matches!(*self.state.borrow(), SlotState::Pending)
    }

    /// Still able to produce a hit.
    fn is_live(&self, now: Instant) -> bool {
        !self.is_expired(now) && !self.is_failed()
    }
}

/// A completed speculative value handed to exactly one request.
#[derive(Debug, Clone)]
pub struct ReadyResult<V> {
    pub value: V,
    /// How long the speculative computation took.
    pub computed_in: Duration,
}

/// Why a request could not be served from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No entry for the action.
    Absent,
    /// The entry outlived its TTL.
    Expired,
    /// The speculative computation failed or was abandoned.
    Failed(String),
    /// The in-flight computation did not finish within the wait limit.
    TimedOut,
}

impl MissReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Absent => "absent",
            Self::Expired => "expired",
            Self::Failed(_) => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// An in-flight entry already removed from the cache. Only its holder can
/// receive the result.
#[derive(Debug)]
pub struct PendingResult<V> {
    entry_id: u64,
    state: watch::Receiver<SlotState<V>>,
}

impl<V: Clone> PendingResult<V> {
    pub fn entry_id(&self) -> u64 {
        self.entry_id
    }

    /// Wait up to `limit` for the computation to settle.
    pub async fn wait(mut self, limit: Duration) -> Result<ReadyResult<V>, MissReason> {
        let settled = tokio::time::timeout(
            limit,
            self.state
                .wait_for(|state| !matches!(state, SlotState::Pending)),
        )
        .await;

        match settled {
            Err(_) => Err(MissReason::TimedOut),
            Ok(Err(_)) => Err(MissReason::Failed("speculation abandoned".to_string())),
            Ok(Ok(state)) => match &*state {
                SlotState::Ready { value, computed_in } => Ok(ReadyResult {
                    value: value.clone(),
                    computed_in: *computed_in,
                }),
                SlotState::Failed(reason) => Err(MissReason::Failed(reason.clone())),
                SlotState::Pending => Err(MissReason::TimedOut),
            },
        }
    }
}

/// Three-way result of [`ResultCache::try_consume`].
#[derive(Debug)]
pub enum Consumption<V> {
    Hit(ReadyResult<V>),
    InFlight(PendingResult<V>),
    Miss(MissReason),
}

/// A freshly inserted entry. The producer publishes through `sender`.
#[derive(Debug)]
pub struct Reservation<V> {
    pub entry_id: u64,
    pub sender: watch::Sender<SlotState<V>>,
    /// An expired or failed entry was displaced to make room.
    pub displaced_expired: bool,
}

/// Thread-safe cache of speculative results with per-action locking.
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: DashMap<Action, SpeculativeEntry<V>>,
    next_id: AtomicU64,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<V: Clone> ResultCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pending entry for `action` unless a live one exists.
    ///
    /// Expired and failed occupants are replaced. Returns `None` when a
    /// live entry is already present.
    pub fn insert_if_absent(&self, action: &Action, ttl: Duration) -> Option<Reservation<V>> {
        let now = Instant::now();
        let (sender, receiver) = watch::channel(SlotState::Pending);
        let entry_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let fresh = SpeculativeEntry {
            id: entry_id,
            deadline: now + ttl,
            state: receiver,
        };

        let displaced_expired = match self.entries.entry(action.clone()) {
            Entry::Occupied(occupied) if occupied.get().is_live(now) => return None,
            Entry::Occupied(mut occupied) => {
                let expired = occupied.get().is_expired(now);
                occupied.insert(fresh);
                expired
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                false
            }
        };

        Some(Reservation {
            entry_id,
            sender,
            displaced_expired,
        })
    }

    /// Remove and classify the entry for `action`.
    pub fn try_consume(&self, action: &Action) -> Consumption<V> {
        let Some((_, entry)) = self.entries.remove(action) else {
            return Consumption::Miss(MissReason::Absent);
        };
        if entry.is_expired(Instant::now()) {
            return Consumption::Miss(MissReason::Expired);
        }

        let state = entry.state.borrow().clone();
        match state {
            SlotState::Ready { value, computed_in } => {
                Consumption::Hit(ReadyResult { value, computed_in })
            }
            SlotState::Failed(reason) => Consumption::Miss(MissReason::Failed(reason)),
            SlotState::Pending => Consumption::InFlight(PendingResult {
                entry_id: entry.id,
                state: entry.state,
            }),
        }
    }

    /// Remove the entry for `action` whatever its state. Never waits on
    /// the computation.
    pub fn expire(&self, action: &Action) -> bool {
        self.entries.remove(action).is_some()
    }

    /// Remove the entry for `action` only if it is still entry `entry_id`.
    pub fn expire_entry(&self, action: &Action, entry_id: u64) -> bool {
        self.entries
            .remove_if(action, |_, entry| entry.id == entry_id)
            .is_some()
    }

    /// Peek at the entry for `action` without consuming it.
    pub fn state(&self, action: &Action) -> Option<SpeculationState> {
        let entry = self.entries.get(action)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        if entry.is_failed() {
            return Some(SpeculationState::Failed);
        }
        let state = match *entry.state.borrow() {
            SlotState::Ready { .. } => SpeculationState::Ready,
            _ => SpeculationState::InFlight,
        };
        Some(state)
    }

    /// Drop every entry past its deadline. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }
}
