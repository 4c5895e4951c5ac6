//! Transient user-facing notifications
//!
//! An append-only list of messages that disappear after a fixed display
//! timeout or on explicit dismissal. Expanding a notification's details pins
//! it so it stays until dismissed.

use crate::error::SimoError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Default time a notification stays visible
pub const DEFAULT_DISPLAY_TIMEOUT_SECS: i64 = 5;

/// Unique notification identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How prominently a notification is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// One line of an itemised notification (e.g. a failed upload)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub name: String,
    pub message: String,
}

/// Expandable extra content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationDetails {
    /// Free text
    Text(String),
    /// List of named entries
    Items(Vec<DetailItem>),
}

/// A single user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub details: Option<NotificationDetails>,
    pub created_at: DateTime<Utc>,
    /// Pinned notifications ignore the display timeout
    pub pinned: bool,
}

/// Configuration for the notification queue
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// How long an unpinned notification stays visible
    pub display_timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_timeout: Duration::seconds(DEFAULT_DISPLAY_TIMEOUT_SECS),
        }
    }
}

/// Ordered queue of live notifications (oldest first)
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    config: NotificationConfig,
    entries: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    /// Append a notification created now.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        details: Option<NotificationDetails>,
    ) -> NotificationId {
        self.push_at(message, severity, details, Utc::now())
    }

    /// Append a notification with an explicit creation time.
    pub fn push_at(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        details: Option<NotificationDetails>,
        created_at: DateTime<Utc>,
    ) -> NotificationId {
        let notification = Notification {
            id: NotificationId::new(),
            message: message.into(),
            severity,
            details,
            created_at,
            pinned: false,
        };
        let id = notification.id;
        debug!(id = %id, severity = %severity, message = %notification.message, "Notification queued");
        self.entries.push(notification);
        id
    }

    /// Queue the user-facing form of an error.
    pub fn report_error(&mut self, error: &SimoError) -> NotificationId {
        self.push(error.to_string(), error.severity(), None)
    }

    /// Remove a notification. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        before != self.entries.len()
    }

    /// Keep a notification visible until dismissed (details expanded).
    pub fn pin(&mut self, id: NotificationId) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.pinned = true;
                true
            }
            None => false,
        }
    }

    /// Drop every unpinned notification older than the display timeout.
    ///
    /// Returns how many were removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let timeout = self.config.display_timeout;
        let before = self.entries.len();
        self.entries
            .retain(|n| n.pinned || now.signed_duration_since(n.created_at) < timeout);
        before - self.entries.len()
    }

    /// Live notifications, oldest first
    pub fn active(&self) -> &[Notification] {
        &self.entries
    }

    /// Remove and return all live notifications
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
