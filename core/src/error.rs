//! Triage errors

/// Errors raised by collaborators and configuration loading.
///
/// Pipeline stages never surface these to callers directly: lookups degrade
/// to absent or sentinel values, and only the request boundary reports them.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// Network error reaching a collaborator (connection refused, reset, etc.)
    #[error("Transport error talking to {service}: {message}")]
    Transport { service: String, message: String },

    /// Collaborator answered with something we cannot interpret
    #[error("Invalid response from {service}: {message}")]
    InvalidResponse { service: String, message: String },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed request or record
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for TriageError {
    fn from(err: config::ConfigError) -> Self {
        TriageError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
