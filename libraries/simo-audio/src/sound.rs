//! Clock-driven sound handle
//!
//! Tracks the play position against the tokio clock so the engine's sampler,
//! seeking and end-of-track detection behave like a real output stream.

use crate::decoder::AudioInfo;
use simo_playback::SoundHandle;
use tokio::time::Instant;

pub struct ClockedSound {
    info: AudioInfo,
    /// Position accumulated before the current play span
    offset: f64,
    started: Option<Instant>,
    gain: f32,
    released: bool,
}

impl ClockedSound {
    pub fn new(info: AudioInfo) -> Self {
        Self {
            info,
            offset: 0.0,
            started: None,
            gain: 1.0,
            released: false,
        }
    }

    pub fn info(&self) -> &AudioInfo {
        &self.info
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    fn elapsed(&self) -> f64 {
        self.started
            .map_or(0.0, |start| start.elapsed().as_secs_f64())
    }
}

impl SoundHandle for ClockedSound {
    fn play(&mut self) {
        if self.released || self.started.is_some() {
            return;
        }
        if self.offset >= self.info.duration {
            self.offset = 0.0;
        }
        self.started = Some(Instant::now());
    }

    fn pause(&mut self) {
        self.offset = self.position();
        self.started = None;
    }

    fn stop(&mut self) {
        self.started = None;
        self.offset = 0.0;
        self.released = true;
    }

    fn seek(&mut self, position: f64) {
        self.offset = position.clamp(0.0, self.info.duration);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn position(&self) -> f64 {
        (self.offset + self.elapsed()).min(self.info.duration)
    }

    fn duration(&self) -> f64 {
        self.info.duration
    }

    fn set_volume(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }
}
