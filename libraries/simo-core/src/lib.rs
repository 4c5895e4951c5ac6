//! SimoMP3 Core
//!
//! Platform-agnostic domain types, user notifications and the process-wide
//! event bus shared by every SimoMP3 crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Library`, `User`
//! - **Notifications**: transient user-facing messages with auto-expiry
//! - **Events**: the "playlist updated" broadcast consumed by library owners
//! - **Error Handling**: the user-facing `SimoError` every crate error maps into
//!
//! # Example
//!
//! ```rust
//! use simo_core::{Library, NotificationQueue, Severity, Track};
//!
//! let mut library = Library::new();
//! library.replace(vec![Track::from_filename("12_intro.mp3")]);
//! assert_eq!(library.tracks()[0].display_name(), "intro.mp3");
//!
//! let mut notifications = NotificationQueue::default();
//! notifications.push("1 file(s) uploaded", Severity::Success, None);
//! assert_eq!(notifications.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod notifications;
pub mod types;

pub use error::{Result, SimoError};
pub use events::{AppEvent, EventBus, UpdateReason};
pub use notifications::{
    DetailItem, Notification, NotificationConfig, NotificationDetails, NotificationId,
    NotificationQueue, Severity,
};
pub use types::{display_name, Library, Track, User};
