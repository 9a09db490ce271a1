//! Test fixtures for Foresight: recorded action sessions and instrumented
//! executors shared by the integration tests of every crate.

pub mod executors;
pub mod sessions;

pub use executors::{GatedExecutor, RecordingExecutor};
pub use sessions::{load_session, ActionSession};
