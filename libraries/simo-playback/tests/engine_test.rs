//! End-to-end tests for the playback engine
//!
//! Sounds are driven by tokio's clock, so every test runs with paused time
//! and lets the runtime auto-advance through the 1 second sampler.

use async_trait::async_trait;
use simo_core::Track;
use simo_playback::{
    PlaybackConfig, PlaybackEngine, PlaybackError, PlaybackEvent, PlaybackState, RepeatMode,
    Result, SoundHandle, SoundLoader,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

// ===== Test doubles =====

#[derive(Default)]
struct SoundLog {
    loads: AtomicUsize,
    stopped: Mutex<Vec<String>>,
    last_volume: Mutex<Option<f32>>,
}

struct FakeSound {
    name: String,
    duration: f64,
    offset: f64,
    started: Option<Instant>,
    log: Arc<SoundLog>,
}

impl SoundHandle for FakeSound {
    fn play(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.offset = self.position();
        self.started = None;
    }

    fn stop(&mut self) {
        self.started = None;
        self.offset = 0.0;
        self.log.stopped.lock().unwrap().push(self.name.clone());
    }

    fn seek(&mut self, position: f64) {
        self.offset = position;
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn position(&self) -> f64 {
        let running = self
            .started
            .map_or(0.0, |started| started.elapsed().as_secs_f64());
        (self.offset + running).min(self.duration)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_volume(&mut self, gain: f32) {
        *self.log.last_volume.lock().unwrap() = Some(gain);
    }
}

#[derive(Default)]
struct FakeLoader {
    durations: HashMap<String, f64>,
    delays: HashMap<String, Duration>,
    unauthorized: HashSet<String>,
    corrupt: HashSet<String>,
    log: Arc<SoundLog>,
}

impl FakeLoader {
    fn track(mut self, name: &str, seconds: f64) -> Self {
        self.durations.insert(name.to_string(), seconds);
        self
    }

    fn delayed(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    fn unauthorized(mut self, name: &str) -> Self {
        self.durations.insert(name.to_string(), 1.0);
        self.unauthorized.insert(name.to_string());
        self
    }

    fn corrupt(mut self, name: &str) -> Self {
        self.durations.insert(name.to_string(), 1.0);
        self.corrupt.insert(name.to_string());
        self
    }
}

#[async_trait]
impl SoundLoader for FakeLoader {
    async fn load(&self, filename: &str) -> Result<Box<dyn SoundHandle>> {
        self.log.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(filename) {
            sleep(*delay).await;
        }
        if self.unauthorized.contains(filename) {
            return Err(PlaybackError::Authorization("token expired".into()));
        }
        if self.corrupt.contains(filename) {
            return Err(PlaybackError::Load("unsupported format".into()));
        }

        Ok(Box::new(FakeSound {
            name: filename.to_string(),
            duration: self.durations.get(filename).copied().unwrap_or(180.0),
            offset: 0.0,
            started: None,
            log: Arc::clone(&self.log),
        }))
    }
}

// ===== Helpers =====

async fn engine_with(loader: FakeLoader, repeat: RepeatMode) -> (PlaybackEngine, Arc<SoundLog>) {
    let log = Arc::clone(&loader.log);
    let names: Vec<String> = {
        let mut names: Vec<String> = loader.durations.keys().cloned().collect();
        names.sort();
        names
    };

    let engine = PlaybackEngine::new(
        Arc::new(loader),
        PlaybackConfig {
            repeat,
            ..PlaybackConfig::default()
        },
    );
    engine
        .set_library(names.into_iter().map(Track::from_filename).collect())
        .await;
    (engine, log)
}

fn abc() -> FakeLoader {
    FakeLoader::default()
        .track("a", 2.0)
        .track("b", 2.0)
        .track("c", 2.0)
}

// ===== Transport =====

#[tokio::test(start_paused = true)]
async fn play_same_track_toggles_instead_of_reloading() {
    let (engine, log) = engine_with(abc(), RepeatMode::None).await;

    engine.play("a").await.unwrap();
    assert_eq!(engine.session().await.state, PlaybackState::Playing);

    engine.play("a").await.unwrap();
    assert_eq!(engine.session().await.state, PlaybackState::Paused);
    assert_eq!(engine.current_track().await.as_deref(), Some("a"));

    engine.play("a").await.unwrap();
    assert_eq!(engine.session().await.state, PlaybackState::Playing);

    assert_eq!(log.loads.load(Ordering::SeqCst), 1);
    assert!(log.stopped.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn switching_tracks_releases_previous_sound_first() {
    let (engine, log) = engine_with(abc(), RepeatMode::None).await;

    engine.play("a").await.unwrap();
    engine.play("b").await.unwrap();

    assert_eq!(*log.stopped.lock().unwrap(), vec!["a".to_string()]);
    assert_eq!(engine.current_track().await.as_deref(), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn sampler_republishes_elapsed_time() {
    let loader = FakeLoader::default().track("long", 60.0);
    let (engine, _) = engine_with(loader, RepeatMode::None).await;
    let mut events = engine.subscribe();

    engine.play("long").await.unwrap();
    sleep(Duration::from_millis(3100)).await;

    let session = engine.session().await;
    assert!((session.current_time - 3.0).abs() < 0.01);
    assert_eq!(session.duration, 60.0);

    let updates = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|e| matches!(e, PlaybackEvent::PositionUpdate { .. }))
        .count();
    assert_eq!(updates, 3);
}

#[tokio::test(start_paused = true)]
async fn pause_stops_sampling() {
    let loader = FakeLoader::default().track("long", 60.0);
    let (engine, _) = engine_with(loader, RepeatMode::None).await;

    engine.play("long").await.unwrap();
    sleep(Duration::from_millis(1500)).await;
    engine.pause().await;

    let paused_at = engine.session().await.current_time;
    assert!((paused_at - 1.5).abs() < 0.01);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(engine.session().await.current_time, paused_at);

    engine.resume().await;
    sleep(Duration::from_millis(1100)).await;
    assert!((engine.session().await.current_time - 2.5).abs() < 0.01);
}

#[tokio::test(start_paused = true)]
async fn stop_clears_session() {
    let (engine, log) = engine_with(abc(), RepeatMode::None).await;

    engine.play("a").await.unwrap();
    sleep(Duration::from_millis(1200)).await;
    engine.stop().await;

    let session = engine.session().await;
    assert_eq!(session.current_track, None);
    assert_eq!(session.state, PlaybackState::Stopped);
    assert_eq!(session.current_time, 0.0);
    assert_eq!(*log.stopped.lock().unwrap(), vec!["a".to_string()]);

    // Nothing loaded: pause/resume are no-ops
    engine.pause().await;
    engine.resume().await;
    assert_eq!(engine.session().await.state, PlaybackState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn seek_clamps_to_track() {
    let loader = FakeLoader::default().track("long", 60.0);
    let (engine, _) = engine_with(loader, RepeatMode::None).await;

    assert!(matches!(
        engine.seek(5.0).await,
        Err(PlaybackError::NoTrackLoaded)
    ));

    engine.play("long").await.unwrap();
    engine.seek(42.0).await.unwrap();
    assert_eq!(engine.session().await.current_time, 42.0);

    engine.seek(500.0).await.unwrap();
    assert_eq!(engine.session().await.current_time, 60.0);

    engine.seek(-1.0).await.unwrap();
    assert_eq!(engine.session().await.current_time, 0.0);

    assert!(matches!(
        engine.seek(f64::NAN).await,
        Err(PlaybackError::InvalidSeekPosition(_))
    ));
}

// ===== Auto-advance =====

#[tokio::test(start_paused = true)]
async fn repeat_none_advances_then_stops() {
    let (engine, _) = engine_with(abc(), RepeatMode::None).await;
    let mut events = engine.subscribe();

    engine.play("b").await.unwrap();
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(engine.current_track().await.as_deref(), Some("c"));

    sleep(Duration::from_secs(3)).await;
    let session = engine.session().await;
    assert_eq!(session.current_track, None);
    assert_eq!(session.state, PlaybackState::Stopped);

    let finished: Vec<String> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|e| match e {
            PlaybackEvent::TrackFinished { filename } => Some(filename),
            _ => None,
        })
        .collect();
    assert_eq!(finished, vec!["b".to_string(), "c".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn repeat_one_restarts_current_track() {
    let (engine, log) = engine_with(abc(), RepeatMode::One).await;

    engine.play("a").await.unwrap();
    sleep(Duration::from_millis(4500)).await;

    assert_eq!(engine.current_track().await.as_deref(), Some("a"));
    assert_eq!(log.loads.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn repeat_all_wraps_to_first() {
    let (engine, _) = engine_with(abc(), RepeatMode::All).await;

    engine.play("c").await.unwrap();
    sleep(Duration::from_millis(2500)).await;

    assert_eq!(engine.current_track().await.as_deref(), Some("a"));
    assert!(engine.session().await.is_playing());
}

// ===== Manual navigation =====

#[tokio::test(start_paused = true)]
async fn next_and_previous_follow_library_order() {
    let (engine, _) = engine_with(abc(), RepeatMode::None).await;

    engine.play("a").await.unwrap();
    assert_eq!(engine.next().await.unwrap().as_deref(), Some("b"));
    assert_eq!(engine.next().await.unwrap().as_deref(), Some("c"));

    // Past the end with repeat off: nothing changes
    assert_eq!(engine.next().await.unwrap(), None);
    assert_eq!(engine.current_track().await.as_deref(), Some("c"));

    assert_eq!(engine.previous().await.unwrap().as_deref(), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn toggle_play_starts_first_track_when_stopped() {
    let (engine, _) = engine_with(abc(), RepeatMode::None).await;

    engine.toggle_play().await.unwrap();
    assert_eq!(engine.current_track().await.as_deref(), Some("a"));

    engine.toggle_play().await.unwrap();
    assert_eq!(engine.session().await.state, PlaybackState::Paused);
}

#[tokio::test(start_paused = true)]
async fn cycle_repeat_and_shuffle() {
    let (engine, _) = engine_with(abc(), RepeatMode::None).await;

    assert_eq!(engine.cycle_repeat().await, RepeatMode::All);
    assert_eq!(engine.cycle_repeat().await, RepeatMode::One);
    assert_eq!(engine.cycle_repeat().await, RepeatMode::None);

    assert!(engine.toggle_shuffle().await);
    let mut shuffled: Vec<String> = engine
        .effective_sequence()
        .await
        .into_iter()
        .map(|t| t.filename)
        .collect();
    shuffled.sort();
    assert_eq!(shuffled, vec!["a", "b", "c"]);

    assert!(!engine.toggle_shuffle().await);
    let linear: Vec<String> = engine
        .effective_sequence()
        .await
        .into_iter()
        .map(|t| t.filename)
        .collect();
    assert_eq!(linear, vec!["a", "b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn library_change_reshuffles_when_on() {
    let (engine, _) = engine_with(abc(), RepeatMode::None).await;
    engine.set_shuffle(true).await;

    engine
        .set_library(
            ["a", "b", "c", "d"]
                .into_iter()
                .map(Track::from_filename)
                .collect(),
        )
        .await;

    assert_eq!(engine.effective_sequence().await.len(), 4);
}

// ===== Library changes =====

#[tokio::test(start_paused = true)]
async fn deleting_current_track_stops_playback() {
    let (engine, log) = engine_with(abc(), RepeatMode::None).await;

    engine.play("b").await.unwrap();
    engine
        .set_library(["a", "c"].into_iter().map(Track::from_filename).collect())
        .await;

    let session = engine.session().await;
    assert_eq!(session.current_track, None);
    assert_eq!(session.state, PlaybackState::Stopped);
    assert_eq!(*log.stopped.lock().unwrap(), vec!["b".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn refetch_keeps_playback_when_track_survives() {
    let (engine, log) = engine_with(abc(), RepeatMode::None).await;

    engine.play("b").await.unwrap();
    engine
        .set_library(["b", "c"].into_iter().map(Track::from_filename).collect())
        .await;

    assert!(engine.session().await.is_playing());
    assert!(log.stopped.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_track_is_rejected() {
    let (engine, log) = engine_with(abc(), RepeatMode::None).await;

    assert!(matches!(
        engine.play("zzz").await,
        Err(PlaybackError::TrackNotFound(_))
    ));
    assert_eq!(log.loads.load(Ordering::SeqCst), 0);
}

// ===== Concurrency =====

#[tokio::test(start_paused = true)]
async fn newer_play_supersedes_slow_load() {
    let loader = abc().delayed("a", Duration::from_secs(5));
    let (engine, log) = engine_with(loader, RepeatMode::None).await;

    let slow = tokio::spawn({
        let engine = engine.clone();
        async move { engine.play("a").await }
    });
    tokio::task::yield_now().await;

    engine.play("b").await.unwrap();
    assert_eq!(engine.current_track().await.as_deref(), Some("b"));

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(engine.current_track().await.as_deref(), Some("b"));

    // The slow load lands after "b" finished and "c" started
    sleep(Duration::from_secs(4)).await;
    slow.await.unwrap().unwrap();

    assert_eq!(engine.current_track().await.as_deref(), None);
    assert!(log.stopped.lock().unwrap().contains(&"a".to_string()));
}

#[tokio::test(start_paused = true)]
async fn stop_discards_in_flight_load() {
    let loader = abc().delayed("a", Duration::from_secs(2));
    let (engine, log) = engine_with(loader, RepeatMode::None).await;

    let pending = tokio::spawn({
        let engine = engine.clone();
        async move { engine.play("a").await }
    });
    tokio::task::yield_now().await;
    engine.stop().await;

    pending.await.unwrap().unwrap();
    assert_eq!(engine.session().await.state, PlaybackState::Stopped);
    assert_eq!(*log.stopped.lock().unwrap(), vec!["a".to_string()]);
}

// ===== Errors =====

#[tokio::test(start_paused = true)]
async fn load_failure_is_returned_once_and_not_fatal() {
    let loader = abc().corrupt("bad");
    let (engine, _) = engine_with(loader, RepeatMode::None).await;
    let mut events = engine.subscribe();

    assert!(matches!(
        engine.play("bad").await,
        Err(PlaybackError::Load(_))
    ));
    assert_eq!(engine.session().await.state, PlaybackState::Stopped);

    // The caller has the error; nothing is broadcast on top of it
    let broadcast = std::iter::from_fn(|| events.try_recv().ok())
        .any(|e| matches!(e, PlaybackEvent::Error { .. }));
    assert!(!broadcast);

    // The engine still works afterwards
    engine.play("a").await.unwrap();
    assert!(engine.session().await.is_playing());
}

#[tokio::test(start_paused = true)]
async fn rejected_token_is_authorization_error() {
    let loader = abc().unauthorized("locked");
    let (engine, _) = engine_with(loader, RepeatMode::None).await;

    assert!(matches!(
        engine.play("locked").await,
        Err(PlaybackError::Authorization(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn auto_advance_failure_is_broadcast() {
    let loader = FakeLoader::default().track("a", 2.0).unauthorized("b");
    let (engine, _) = engine_with(loader, RepeatMode::None).await;
    let mut events = engine.subscribe();

    engine.play("a").await.unwrap();
    sleep(Duration::from_secs(4)).await;

    let errors: Vec<PlaybackEvent> = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|e| matches!(e, PlaybackEvent::Error { .. }))
        .collect();
    assert_eq!(
        errors,
        vec![PlaybackEvent::Error {
            filename: "b".to_string(),
            message: "Not authorized: token expired".to_string(),
            unauthorized: true,
        }]
    );
    assert_eq!(engine.session().await.state, PlaybackState::Stopped);
    assert_eq!(engine.current_track().await, None);
}

// ===== Volume =====

#[tokio::test(start_paused = true)]
async fn volume_is_applied_to_new_and_live_sounds() {
    let (engine, log) = engine_with(abc(), RepeatMode::None).await;

    engine.set_volume(0.3).await;
    engine.play("a").await.unwrap();
    assert_eq!(*log.last_volume.lock().unwrap(), Some(0.3));

    engine.mute().await;
    assert_eq!(*log.last_volume.lock().unwrap(), Some(0.0));
    assert!(engine.is_muted().await);

    engine.unmute().await;
    engine.set_volume(7.0).await;
    assert_eq!(engine.volume().await, 1.0);

    engine.play("b").await.unwrap();
    assert_eq!(*log.last_volume.lock().unwrap(), Some(1.0));
}
