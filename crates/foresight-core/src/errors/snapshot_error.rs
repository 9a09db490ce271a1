//! Model snapshot import/export errors.

/// Errors raised while decoding or applying a model snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invalid weight {weight} for {from} -> {to}")]
    InvalidWeight { from: String, to: String, weight: f64 },
}
