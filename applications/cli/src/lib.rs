//! SimoMP3 command-line client
//!
//! Log in, manage the uploaded library, import YouTube playlists and play
//! tracks from a terminal. Exposes its building blocks for testing.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod player;
pub mod session_store;
pub mod theme;

pub use app::App;
pub use config::CliConfig;
pub use error::{CliError, Result};
pub use player::{dispatch, on_playback_event, spawn_library_sync, PlayerCommand};
pub use session_store::SessionStore;
pub use theme::{Palette, Theme};
