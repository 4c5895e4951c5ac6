//! Error types for playback

use simo_core::SimoError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Track is not part of the library
    #[error("Track not in library: {0}")]
    TrackNotFound(String),

    /// Invalid seek position
    #[error("Invalid seek position: {0}")]
    InvalidSeekPosition(f64),

    /// The server rejected the session while fetching audio
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Audio could not be fetched (no response)
    #[error("Network error: {0}")]
    Network(String),

    /// Fetching, decoding or opening the sound failed
    #[error("Could not load track: {0}")]
    Load(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

impl From<PlaybackError> for SimoError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Authorization(msg) => SimoError::Authorization(msg),
            PlaybackError::Network(msg) => SimoError::Network(msg),
            other => SimoError::Playback(other.to_string()),
        }
    }
}
