//! SimoMP3 - Playback
//!
//! Transport and queue logic for SimoMP3, independent of how audio is
//! fetched or rendered.
//!
//! This crate provides:
//! - Playback engine owning one live sound at a time
//! - Play/pause toggle on the loaded track, stop, seek, next/previous
//! - Elapsed-time sampling while playing (default every second)
//! - Auto-advance on natural end of track
//! - Shuffle (Fisher-Yates) and repeat modes (None, All, One)
//! - Volume (0.0-1.0, mute/unmute)
//!
//! # Architecture
//!
//! `simo-playback` never talks HTTP or decodes audio. Platform code provides
//! a [`SoundLoader`] that turns a server filename into a [`SoundHandle`];
//! `simo-audio` has the implementation backed by the REST client.
//!
//! # Example: Ordering policy
//!
//! ```rust
//! use simo_core::Track;
//! use simo_playback::{QueueState, RepeatMode};
//!
//! let library: Vec<Track> = ["1_a.mp3", "1_b.mp3"]
//!     .into_iter()
//!     .map(Track::from_filename)
//!     .collect();
//!
//! let queue = QueueState::new(RepeatMode::All);
//! let next = queue.next(&library, Some("1_b.mp3")).unwrap();
//! assert_eq!(next.filename, "1_a.mp3");
//! ```

pub mod engine;
pub mod error;
pub mod events;
pub mod queue;
pub mod shuffle;
pub mod source;
pub mod types;
pub mod volume;

pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use queue::{next_in, previous_in, QueueState};
pub use source::{SoundHandle, SoundLoader};
pub use types::{format_time, PlaybackConfig, PlaybackSession, PlaybackState, RepeatMode};
pub use volume::Volume;
