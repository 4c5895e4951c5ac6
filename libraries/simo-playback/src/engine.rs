//! Playback engine - transport orchestration
//!
//! Owns the single live sound, the elapsed-time sampler and the transport
//! controls. Ordering decisions are delegated to [`QueueState`].
//!
//! All mutable state sits behind one async mutex that is never held while a
//! track is loading. Every load carries a generation number; a load that
//! finishes after a newer `play()`/`stop()` has bumped the generation is
//! released on arrival instead of being installed, so at most one sound is
//! ever live.

use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::queue::QueueState;
use crate::source::{SoundHandle, SoundLoader};
use crate::types::{PlaybackConfig, PlaybackSession, PlaybackState, RepeatMode};
use crate::volume::Volume;
use simo_core::{Library, Track};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Buffered events per subscriber before lagging
const EVENT_CAPACITY: usize = 64;

/// Cloneable handle to the playback engine.
///
/// # Example
///
/// ```ignore
/// let engine = PlaybackEngine::new(loader, PlaybackConfig::default());
/// engine.set_library(tracks).await;
///
/// engine.play("7_song.mp3").await?; // loads and starts
/// engine.play("7_song.mp3").await?; // same track: pauses
/// engine.next().await?;
/// ```
#[derive(Clone)]
pub struct PlaybackEngine {
    inner: Arc<Inner>,
}

struct Inner {
    loader: Arc<dyn SoundLoader>,
    sample_interval: Duration,
    events: broadcast::Sender<PlaybackEvent>,
    state: Mutex<EngineState>,
}

struct EngineState {
    library: Library,
    queue: QueueState,
    session: PlaybackSession,
    sound: Option<Box<dyn SoundHandle>>,
    volume: Volume,
    /// Bumped whenever the live sound is replaced or released
    generation: u64,
    sampler: Option<JoinHandle<()>>,
}

impl EngineState {
    /// Stop sampling and release the live sound.
    fn release(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.abort();
        }
        if let Some(mut sound) = self.sound.take() {
            sound.stop();
        }
    }

    fn apply_volume(&mut self) {
        let gain = self.volume.gain();
        if let Some(sound) = self.sound.as_mut() {
            sound.set_volume(gain);
        }
    }
}

impl Inner {
    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }

    /// Release everything and reset the session to stopped.
    fn stop_locked(&self, st: &mut EngineState) {
        st.release();
        st.generation += 1;

        let previous = st.session.current_track.take();
        let was = st.session.state;
        st.session = PlaybackSession::default();

        if previous.is_some() {
            self.emit(PlaybackEvent::TrackChanged {
                filename: None,
                previous,
            });
        }
        if was != PlaybackState::Stopped {
            self.emit(PlaybackEvent::StateChanged {
                state: PlaybackState::Stopped,
            });
        }
    }

    fn pause_locked(&self, st: &mut EngineState) {
        if st.session.state != PlaybackState::Playing {
            return;
        }
        let Some(sound) = st.sound.as_mut() else {
            return;
        };

        sound.pause();
        st.session.current_time = sound.position();
        if let Some(sampler) = st.sampler.take() {
            sampler.abort();
        }
        st.session.state = PlaybackState::Paused;

        debug!(time = st.session.current_time, "Paused");
        self.emit(PlaybackEvent::StateChanged {
            state: PlaybackState::Paused,
        });
    }
}

impl PlaybackEngine {
    /// Create an engine that loads sounds through `loader`.
    pub fn new(loader: Arc<dyn SoundLoader>, config: PlaybackConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let mut queue = QueueState::new(config.repeat);
        if config.shuffle {
            queue.set_shuffle(true, &[]);
        }

        let state = EngineState {
            library: Library::new(),
            queue,
            session: PlaybackSession::default(),
            sound: None,
            volume: Volume::new(config.volume),
            generation: 0,
            sampler: None,
        };

        Self {
            inner: Arc::new(Inner {
                loader,
                sample_interval: config.sample_interval,
                events,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.events.subscribe()
    }

    // ===== Library =====

    /// Replace the library after a refetch.
    ///
    /// Redraws the shuffle order when shuffle is on and stops playback when
    /// the current track is gone.
    pub async fn set_library(&self, tracks: Vec<Track>) {
        let mut guard = self.inner.state.lock().await;
        let st = &mut *guard;

        if st.library.replace(tracks) {
            st.queue.library_changed(st.library.tracks());
            debug!(tracks = st.library.len(), "Library changed");
        }

        let vanished = st
            .session
            .current_track
            .as_deref()
            .is_some_and(|current| !st.library.contains(current));
        if vanished {
            info!(track = ?st.session.current_track, "Current track left the library, stopping");
            self.inner.stop_locked(st);
        }
    }

    /// Tracks in library order
    pub async fn tracks(&self) -> Vec<Track> {
        self.inner.state.lock().await.library.tracks().to_vec()
    }

    /// Tracks in the order next/previous walk
    pub async fn effective_sequence(&self) -> Vec<Track> {
        let st = self.inner.state.lock().await;
        st.queue.effective_sequence(st.library.tracks()).to_vec()
    }

    // ===== Transport =====

    /// Play a track.
    ///
    /// Playing the track that is already loaded toggles pause/resume instead
    /// of reloading it.
    pub async fn play(&self, filename: &str) -> Result<()> {
        {
            let mut guard = self.inner.state.lock().await;
            let st = &mut *guard;
            if st.sound.is_some() && st.session.current_track.as_deref() == Some(filename) {
                if st.session.state == PlaybackState::Playing {
                    self.inner.pause_locked(st);
                } else {
                    resume_locked(&self.inner, st);
                }
                return Ok(());
            }
        }

        start_track(&self.inner, filename.to_string()).await
    }

    /// Pause. No-op when nothing is playing.
    pub async fn pause(&self) {
        let mut guard = self.inner.state.lock().await;
        self.inner.pause_locked(&mut guard);
    }

    /// Resume. No-op when nothing is paused.
    pub async fn resume(&self) {
        let mut guard = self.inner.state.lock().await;
        resume_locked(&self.inner, &mut guard);
    }

    /// Pause, resume, or start the first track when nothing is loaded.
    pub async fn toggle_play(&self) -> Result<()> {
        let first = {
            let mut guard = self.inner.state.lock().await;
            let st = &mut *guard;
            match st.session.state {
                PlaybackState::Playing => {
                    self.inner.pause_locked(st);
                    return Ok(());
                }
                PlaybackState::Paused => {
                    resume_locked(&self.inner, st);
                    return Ok(());
                }
                PlaybackState::Loading => return Ok(()),
                PlaybackState::Stopped => st
                    .queue
                    .next(st.library.tracks(), None)
                    .map(|t| t.filename.clone()),
            }
        };

        match first {
            Some(filename) => start_track(&self.inner, filename).await,
            None => Ok(()),
        }
    }

    /// Stop, release the sound and clear the current track.
    ///
    /// Also discards a load still in flight.
    pub async fn stop(&self) {
        let mut guard = self.inner.state.lock().await;
        self.inner.stop_locked(&mut guard);
        info!("Playback stopped");
    }

    /// Move to `time` seconds, clamped to the track.
    pub async fn seek(&self, time: f64) -> Result<()> {
        if !time.is_finite() {
            return Err(PlaybackError::InvalidSeekPosition(time));
        }

        let mut guard = self.inner.state.lock().await;
        let st = &mut *guard;
        let Some(sound) = st.sound.as_mut() else {
            return Err(PlaybackError::NoTrackLoaded);
        };

        let duration = sound.duration();
        let target = time.clamp(0.0, duration.max(0.0));
        sound.seek(target);
        st.session.current_time = target;

        debug!(time = target, "Seek");
        self.inner.emit(PlaybackEvent::PositionUpdate {
            current_time: target,
            duration,
        });
        Ok(())
    }

    /// Skip forward. Returns the track started, if any.
    ///
    /// With repeat-one this restarts the current track; past the end with
    /// repeat off nothing changes.
    pub async fn next(&self) -> Result<Option<String>> {
        let target = {
            let st = self.inner.state.lock().await;
            st.queue
                .next(st.library.tracks(), st.session.current_track.as_deref())
                .map(|t| t.filename.clone())
        };
        self.skip_to(target).await
    }

    /// Skip back. Returns the track started, if any.
    pub async fn previous(&self) -> Result<Option<String>> {
        let target = {
            let st = self.inner.state.lock().await;
            st.queue
                .previous(st.library.tracks(), st.session.current_track.as_deref())
                .map(|t| t.filename.clone())
        };
        self.skip_to(target).await
    }

    async fn skip_to(&self, target: Option<String>) -> Result<Option<String>> {
        match target {
            Some(filename) => {
                start_track(&self.inner, filename.clone()).await?;
                Ok(Some(filename))
            }
            None => Ok(None),
        }
    }

    // ===== Shuffle & Repeat =====

    /// Flip shuffle. Returns the new state.
    pub async fn toggle_shuffle(&self) -> bool {
        let mut guard = self.inner.state.lock().await;
        let st = &mut *guard;
        st.queue.toggle_shuffle(st.library.tracks())
    }

    pub async fn set_shuffle(&self, enabled: bool) {
        let mut guard = self.inner.state.lock().await;
        let st = &mut *guard;
        st.queue.set_shuffle(enabled, st.library.tracks());
    }

    pub async fn shuffle_enabled(&self) -> bool {
        self.inner.state.lock().await.queue.shuffle_enabled()
    }

    pub async fn set_repeat(&self, mode: RepeatMode) {
        self.inner.state.lock().await.queue.set_repeat(mode);
        debug!(mode = %mode, "Repeat changed");
    }

    /// Advance the repeat mode (none, all, one). Returns the new mode.
    pub async fn cycle_repeat(&self) -> RepeatMode {
        let mode = self.inner.state.lock().await.queue.cycle_repeat();
        debug!(mode = %mode, "Repeat changed");
        mode
    }

    pub async fn repeat_mode(&self) -> RepeatMode {
        self.inner.state.lock().await.queue.repeat_mode()
    }

    // ===== Volume =====

    /// Set volume (0.0-1.0, clamped).
    ///
    /// Applied to the live sound and to every sound loaded later.
    pub async fn set_volume(&self, level: f32) {
        self.update_volume(|v| v.set_level(level)).await;
    }

    pub async fn mute(&self) {
        self.update_volume(Volume::mute).await;
    }

    pub async fn unmute(&self) {
        self.update_volume(Volume::unmute).await;
    }

    pub async fn toggle_mute(&self) {
        self.update_volume(Volume::toggle_mute).await;
    }

    pub async fn volume(&self) -> f32 {
        self.inner.state.lock().await.volume.level()
    }

    pub async fn is_muted(&self) -> bool {
        self.inner.state.lock().await.volume.is_muted()
    }

    async fn update_volume(&self, change: impl FnOnce(&mut Volume)) {
        let mut guard = self.inner.state.lock().await;
        change(&mut guard.volume);
        guard.apply_volume();

        self.inner.emit(PlaybackEvent::VolumeChanged {
            level: guard.volume.level(),
            muted: guard.volume.is_muted(),
        });
    }

    // ===== State Queries =====

    pub async fn session(&self) -> PlaybackSession {
        self.inner.state.lock().await.session.clone()
    }

    pub async fn current_track(&self) -> Option<String> {
        self.inner.state.lock().await.session.current_track.clone()
    }
}

fn resume_locked(inner: &Arc<Inner>, st: &mut EngineState) {
    if st.session.state != PlaybackState::Paused {
        return;
    }
    let Some(sound) = st.sound.as_mut() else {
        return;
    };

    sound.play();
    st.session.state = PlaybackState::Playing;
    st.sampler = Some(spawn_sampler(inner, st.generation));

    debug!(time = st.session.current_time, "Resumed");
    inner.emit(PlaybackEvent::StateChanged {
        state: PlaybackState::Playing,
    });
}

/// Release the current sound and load `filename` from scratch.
async fn start_track(inner: &Arc<Inner>, filename: String) -> Result<()> {
    let (generation, previous) = {
        let mut guard = inner.state.lock().await;
        let st = &mut *guard;
        if !st.library.contains(&filename) {
            return Err(PlaybackError::TrackNotFound(filename));
        }

        st.release();
        st.generation += 1;
        let previous = st.session.current_track.take();
        st.session = PlaybackSession {
            state: PlaybackState::Loading,
            ..PlaybackSession::default()
        };
        inner.emit(PlaybackEvent::StateChanged {
            state: PlaybackState::Loading,
        });
        (st.generation, previous)
    };

    debug!(track = %filename, generation, "Loading track");
    let loaded = inner.loader.load(&filename).await;

    let mut guard = inner.state.lock().await;
    let st = &mut *guard;

    if st.generation != generation {
        debug!(track = %filename, generation, "Load superseded, releasing");
        if let Ok(mut sound) = loaded {
            sound.stop();
        }
        return Ok(());
    }

    let failure = match loaded {
        Ok(mut sound) if !st.library.contains(&filename) => {
            sound.stop();
            Some(PlaybackError::TrackNotFound(filename.clone()))
        }
        Ok(mut sound) => {
            sound.set_volume(st.volume.gain());
            sound.play();

            st.session = PlaybackSession {
                current_track: Some(filename.clone()),
                state: PlaybackState::Playing,
                duration: sound.duration(),
                current_time: 0.0,
            };
            st.sound = Some(sound);
            st.sampler = Some(spawn_sampler(inner, generation));
            None
        }
        Err(e) => Some(e),
    };

    if let Some(e) = failure {
        warn!(track = %filename, error = %e, "Failed to load track");
        st.session = PlaybackSession::default();
        if previous.is_some() {
            inner.emit(PlaybackEvent::TrackChanged {
                filename: None,
                previous,
            });
        }
        inner.emit(PlaybackEvent::StateChanged {
            state: PlaybackState::Stopped,
        });
        return Err(e);
    }

    info!(track = %filename, duration = st.session.duration, "Playing");
    inner.emit(PlaybackEvent::TrackChanged {
        filename: Some(filename),
        previous,
    });
    inner.emit(PlaybackEvent::StateChanged {
        state: PlaybackState::Playing,
    });
    Ok(())
}

fn spawn_sampler(inner: &Arc<Inner>, generation: u64) -> JoinHandle<()> {
    tokio::spawn(run_sampler(
        Arc::downgrade(inner),
        generation,
        inner.sample_interval,
    ))
}

/// Republish the live position every `period` while playing.
///
/// Ends itself on natural end-of-track and hands over to the ordering
/// policy. Pause, stop and track changes abort it.
async fn run_sampler(inner: Weak<Inner>, generation: u64, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            return;
        };

        let finished = {
            let mut guard = inner.state.lock().await;
            let st = &mut *guard;
            if st.generation != generation || st.session.state != PlaybackState::Playing {
                return;
            }
            let Some(sound) = st.sound.as_ref() else {
                return;
            };

            let duration = sound.duration();
            let current_time = sound.position().min(duration);
            let done = sound.is_finished();

            st.session.current_time = current_time;
            inner.emit(PlaybackEvent::PositionUpdate {
                current_time,
                duration,
            });

            if done {
                // Detach rather than abort: this task is the sampler
                st.sampler = None;
                st.session.current_track.clone()
            } else {
                None
            }
        };

        if let Some(filename) = finished {
            advance_after_end(&inner, generation, filename).await;
            return;
        }
    }
}

/// Start whatever the ordering policy picks after `finished`, or stop.
///
/// Nobody awaits this, so a failed load is broadcast as
/// [`PlaybackEvent::Error`].
async fn advance_after_end(inner: &Arc<Inner>, generation: u64, finished: String) {
    let next = {
        let mut guard = inner.state.lock().await;
        let st = &mut *guard;
        // A pause, stop or new track between the last sample and here wins
        if st.generation != generation
            || st.session.state != PlaybackState::Playing
            || st.session.current_track.as_deref() != Some(finished.as_str())
        {
            debug!(track = %finished, "End of track overtaken, not advancing");
            return;
        }

        info!(track = %finished, "Track finished");
        inner.emit(PlaybackEvent::TrackFinished {
            filename: finished.clone(),
        });

        let next = st
            .queue
            .next(st.library.tracks(), Some(finished.as_str()))
            .map(|t| t.filename.clone());
        if next.is_none() {
            inner.stop_locked(st);
        }
        next
    };

    if let Some(next) = next {
        debug!(track = %next, "Auto-advancing");
        if let Err(e) = start_track(inner, next.clone()).await {
            warn!(error = %e, "Auto-advance failed");
            inner.emit(PlaybackEvent::Error {
                filename: next,
                message: e.to_string(),
                unauthorized: matches!(e, PlaybackError::Authorization(_)),
            });
        }
    }
}
