//! Domain types for SimoMP3
//!
//! Provides the track, library and user types shared by the client, playback
//! and application crates.

mod library;
mod track;
mod user;

pub use library::Library;
pub use track::{display_name, Track};
pub use user::User;
