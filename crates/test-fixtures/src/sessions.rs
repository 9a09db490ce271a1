//! Recorded action sessions stored as JSON under `data/sessions/`.

use std::path::PathBuf;

use foresight_core::Action;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// An ordered trace of actions a user performed.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSession {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub actions: Vec<Action>,
}

impl ActionSession {
    /// Consecutive `(previous, next)` pairs of the trace.
    pub fn transitions(&self) -> impl Iterator<Item = (&Action, &Action)> {
        self.actions.iter().zip(self.actions.iter().skip(1))
    }
}

fn data_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file relative to `data/`.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = data_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load `data/sessions/<name>.json`.
pub fn load_session(name: &str) -> ActionSession {
    load_fixture(&format!("sessions/{name}.json"))
}
