//! SimoMP3 - Audio
//!
//! Connects the playback engine to the server: fetches track bytes through
//! `simo-client`, probes them with Symphonia and hands the engine a
//! clock-driven [`ClockedSound`].
//!
//! # Example
//!
//! ```rust,no_run
//! use simo_audio::RemoteSoundLoader;
//! use simo_client::{ClientConfig, SimoClient};
//! use simo_playback::{PlaybackConfig, PlaybackEngine};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SimoClient::new(ClientConfig::new("http://localhost:5000"))?;
//! client.login("alice", "secret").await?;
//!
//! let engine = PlaybackEngine::new(
//!     Arc::new(RemoteSoundLoader::new(client.clone())),
//!     PlaybackConfig::default(),
//! );
//! engine.play("1700000000000_song.mp3").await?;
//! # Ok(())
//! # }
//! ```

pub mod decoder;
pub mod error;
pub mod loader;
pub mod sound;

pub use decoder::{probe, AudioInfo};
pub use error::{AudioError, Result};
pub use loader::RemoteSoundLoader;
pub use sound::ClockedSound;
