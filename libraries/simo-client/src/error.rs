//! Error types for the SimoMP3 client.

use simo_core::SimoError;
use thiserror::Error;

/// Errors that can occur when talking to the SimoMP3 server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response: connection refused, timeout, DNS failure
    #[error("Server unreachable: {0}")]
    Network(String),

    /// HTTP layer failed after a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server rejected the token or credentials (401/403)
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Authentication required but no token available
    #[error("Authentication required")]
    AuthRequired,

    /// Server returned a non-OK response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Local input checks failed before any request was made
    #[error("{0}")]
    Validation(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// IO error while reading a file to upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for SimoError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(msg) => SimoError::Network(msg),
            ClientError::Request(e) => SimoError::Network(e.to_string()),
            ClientError::Authorization(msg) => SimoError::Authorization(msg),
            ClientError::AuthRequired => SimoError::Authorization("please log in".to_string()),
            ClientError::ServerError { status, message } => SimoError::Server { status, message },
            ClientError::Validation(msg) | ClientError::InvalidUrl(msg) => {
                SimoError::Validation(msg)
            }
            // A 2xx with an unreadable body is still the server's fault
            ClientError::ParseError(message) => SimoError::Server { status: 0, message },
            ClientError::Io(e) => SimoError::Io(e),
        }
    }
}
