//! Core types for playback

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    #[default]
    Stopped,

    /// Fetching/decoding a track
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last track
    #[default]
    None,

    /// Loop the whole sequence
    All,

    /// Loop the current track
    One,
}

impl RepeatMode {
    /// Next mode in the button cycle: none, all, one, none.
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::One,
            Self::One => Self::None,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::All => "all",
            Self::One => "one",
        })
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "all" => Ok(Self::All),
            "one" => Ok(Self::One),
            other => Err(format!("unknown repeat mode: {}", other)),
        }
    }
}

/// Snapshot of what is playing.
///
/// `current_track` is either `None` or a filename present in the library.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub current_track: Option<String>,
    pub state: PlaybackState,
    /// Track length in seconds
    pub duration: f64,
    /// Elapsed time in seconds, as last sampled or set by a seek
    pub current_time: f64,
}

impl PlaybackSession {
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}

/// Configuration for the playback engine
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// How often the elapsed time is sampled while playing (default: 1s)
    pub sample_interval: Duration,

    /// Initial volume (0.0-1.0, default: 0.7)
    pub volume: f32,

    /// Initial repeat mode (default: None)
    pub repeat: RepeatMode,

    /// Start with shuffle on (default: false)
    pub shuffle: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(1),
            volume: 0.7,
            repeat: RepeatMode::None,
            shuffle: false,
        }
    }
}

/// Format seconds as `m:ss`.
///
/// ```
/// assert_eq!(simo_playback::format_time(75.4), "1:15");
/// assert_eq!(simo_playback::format_time(f64::NAN), "0:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
