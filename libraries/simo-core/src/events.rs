//! Process-wide application events
//!
//! The "playlist updated" signal is broadcast after uploads, deletions and
//! imports. Whichever component owns the library subscribes and refetches,
//! without touching playback state.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered events per subscriber before lagging
const EVENT_CAPACITY: usize = 64;

/// Why the server-side library changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateReason {
    Upload,
    Delete,
    Import,
}

/// Events shared across components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppEvent {
    /// The library on the server changed and should be refetched
    PlaylistUpdated { reason: UpdateReason },
}

/// Cloneable handle to the application event channel
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Broadcast an event. Returns how many subscribers received it.
    pub fn publish(&self, event: AppEvent) -> usize {
        trace!(?event, "Publishing app event");
        // No subscribers is not an error
        self.sender.send(event).unwrap_or(0)
    }

    /// Shorthand for `PlaylistUpdated`
    pub fn playlist_updated(&self, reason: UpdateReason) -> usize {
        self.publish(AppEvent::PlaylistUpdated { reason })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_updates() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        assert_eq!(bus.playlist_updated(UpdateReason::Upload), 2);

        let expected = AppEvent::PlaylistUpdated {
            reason: UpdateReason::Upload,
        };
        assert_eq!(first.recv().await.unwrap(), expected);
        assert_eq!(second.recv().await.unwrap(), expected);
    }

    #[test]
    fn publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.playlist_updated(UpdateReason::Delete), 0);
    }
}
