/// Error types for audio probing and loading
use simo_client::ClientError;
use simo_playback::PlaybackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Symphonia error: {0}")]
    Symphonia(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type Result<T> = std::result::Result<T, AudioError>;

impl From<AudioError> for PlaybackError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Client(ClientError::Authorization(msg)) => PlaybackError::Authorization(msg),
            AudioError::Client(ClientError::AuthRequired) => {
                PlaybackError::Authorization("please log in".to_string())
            }
            AudioError::Client(ClientError::Network(msg)) => PlaybackError::Network(msg),
            AudioError::Client(ClientError::Request(e)) => PlaybackError::Network(e.to_string()),
            other => PlaybackError::Load(other.to_string()),
        }
    }
}
