//! Playback events
//!
//! Emitted on a broadcast channel so front ends can follow the engine:
//! - State changes (loading/play/pause/stop)
//! - Track changes, including to no track
//! - Position updates from the elapsed-time sampler
//! - Natural end of a track
//! - Load failures while auto-advancing

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback state changed
    StateChanged { state: PlaybackState },

    /// Current track changed; `None` once playback ends or stops
    TrackChanged {
        filename: Option<String>,
        previous: Option<String>,
    },

    /// Elapsed time sampled, or set by a seek
    PositionUpdate { current_time: f64, duration: f64 },

    /// Track played to its end
    TrackFinished { filename: String },

    /// Volume or mute changed
    VolumeChanged { level: f32, muted: bool },

    /// Auto-advance could not load the next track; the session is
    /// otherwise intact. Loads started through the engine's methods report
    /// their failure as the returned error instead.
    Error {
        filename: String,
        message: String,
        /// The server rejected the session
        unauthorized: bool,
    },
}
