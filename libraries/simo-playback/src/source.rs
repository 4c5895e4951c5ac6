//! Sound handle and loader traits
//!
//! The engine never decodes or fetches audio itself. A [`SoundLoader`] turns
//! a server filename into a live [`SoundHandle`]; the engine owns at most one
//! handle at a time.

use crate::error::Result;
use async_trait::async_trait;

/// One loaded, playable track.
///
/// Positions and durations are in seconds.
pub trait SoundHandle: Send {
    /// Start or resume output
    fn play(&mut self);

    /// Pause without releasing anything
    fn pause(&mut self);

    /// Stop and release the underlying resource
    fn stop(&mut self);

    /// Move the play position
    fn seek(&mut self, position: f64);

    /// Current play position
    fn position(&self) -> f64;

    /// Total track duration
    fn duration(&self) -> f64;

    /// Apply a linear gain (0.0-1.0)
    fn set_volume(&mut self, gain: f32);

    /// Whether playback reached the end of the track
    fn is_finished(&self) -> bool {
        self.position() >= self.duration()
    }
}

/// Produces sound handles for library tracks.
#[async_trait]
pub trait SoundLoader: Send + Sync {
    /// Fetch and open `filename`.
    ///
    /// A rejected session must surface as `PlaybackError::Authorization`.
    async fn load(&self, filename: &str) -> Result<Box<dyn SoundHandle>>;
}
