//! Configuration errors.

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

impl ConfigError {
    /// The offending field for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { field, .. } => Some(field),
            _ => None,
        }
    }
}
