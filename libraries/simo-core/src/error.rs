/// User-facing error kinds for SimoMP3
use crate::notifications::Severity;
use thiserror::Error;

/// Result type alias using `SimoError`
pub type Result<T> = std::result::Result<T, SimoError>;

/// Error kinds surfaced to the user.
///
/// Crate-level errors (`ClientError`, `PlaybackError`, ...) convert into this
/// type at the call site so they can be reported as a notification or an
/// inline form error. None of them is meant to terminate the application.
#[derive(Error, Debug)]
pub enum SimoError {
    /// No response from the server (connection refused, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// The server rejected or no longer accepts the session token
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Non-OK response carrying a structured `{error}` body
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Local form checks (mismatched passwords, empty fields)
    #[error("{0}")]
    Validation(String),

    /// Decode/load failure of an audio resource
    #[error("Playback error: {0}")]
    Playback(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl SimoError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an authorization error
    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Severity used when the error is shown as a notification.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Validation(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether the session should be considered expired.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}
