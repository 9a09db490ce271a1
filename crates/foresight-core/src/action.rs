//! Action identifiers and two-step pattern keys.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the two actions of a rendered pattern key.
pub const PATTERN_SEPARATOR: &str = "->";

/// An opaque unit of observed or requested work.
///
/// Equality, hashing and ordering are by value. The engine attaches no
/// meaning to the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Action> for Action {
    fn from(value: &Action) -> Self {
        value.clone()
    }
}

impl AsRef<str> for Action {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Action {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The two most recent actions of a trajectory.
///
/// Used as a secondary Transition Model source key: the key rendered by
/// [`PatternKey::as_action`] is an ordinary [`Action`] and can be
/// reinforced and looked up like any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternKey {
    /// The action observed before `current`.
    pub previous: Action,
    /// The most recently observed action.
    pub current: Action,
}

impl PatternKey {
    pub fn new(previous: impl Into<Action>, current: impl Into<Action>) -> Self {
        Self {
            previous: previous.into(),
            current: current.into(),
        }
    }

    /// Render the pattern as a model source key: `"<previous>-><current>"`.
    pub fn as_action(&self) -> Action {
        Action(format!(
            "{}{}{}",
            self.previous, PATTERN_SEPARATOR, self.current
        ))
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.previous, PATTERN_SEPARATOR, self.current)
    }
}
