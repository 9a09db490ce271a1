//! Portable export of the learned transition weights.
//!
//! The engine never persists its model; hosts that want learning to
//! survive a restart export a snapshot and import it into the next engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::errors::SnapshotError;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One learned edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: Action,
    pub to: Action,
    pub weight: f64,
}

/// Serializable copy of a transition model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub transitions: Vec<TransitionRecord>,
}

impl ModelSnapshot {
    pub fn new(transitions: Vec<TransitionRecord>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            transitions,
        }
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Check the version and that every weight lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        for record in &self.transitions {
            if !(0.0..=1.0).contains(&record.weight) {
                return Err(SnapshotError::InvalidWeight {
                    from: record.from.to_string(),
                    to: record.to.to_string(),
                    weight: record.weight,
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate a snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: ModelSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
