//! Rendering of tracks, metadata and notifications

use crate::theme::Palette;
use chrono::Utc;
use simo_client::{ImportHistory, ImportStatus, TrackMetadata};
use simo_core::{Notification, NotificationDetails, NotificationId, NotificationQueue, Track};
use std::collections::HashSet;
use std::fmt::Write;

/// Numbered track listing, marking `current` with an arrow
pub fn render_tracks(tracks: &[Track], current: Option<&str>, palette: &Palette) -> String {
    if tracks.is_empty() {
        return palette.muted("No tracks uploaded yet");
    }

    let mut out = String::new();
    for (i, track) in tracks.iter().enumerate() {
        let marker = if current == Some(track.filename.as_str()) {
            "▶"
        } else {
            " "
        };
        let date = track
            .upload_date
            .as_ref()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{} {:>3}. {} {}",
            marker,
            i + 1,
            track.display_name(),
            palette.muted(&date)
        );
    }
    out.trim_end().to_string()
}

pub fn render_metadata(filename: &str, metadata: &TrackMetadata, palette: &Palette) -> String {
    let title = metadata
        .title
        .clone()
        .unwrap_or_else(|| simo_core::display_name(filename).to_string());

    let mut out = palette.accent(&title);
    for (label, value) in [
        ("Artist", &metadata.artist),
        ("Album", &metadata.album),
        ("Year", &metadata.year),
        ("Genre", &metadata.genre),
    ] {
        if let Some(value) = value {
            let _ = write!(out, "\n  {:<7}{}", label, value);
        }
    }
    if metadata.artwork.is_some() {
        let _ = write!(out, "\n  {}", palette.muted("(artwork available)"));
    }
    out
}

pub fn render_notification(notification: &Notification, palette: &Palette) -> String {
    let color = palette.severity(notification.severity);
    let label = format!("[{}]", notification.severity);
    let mut out = format!("{} {}", palette.paint(&label, color), notification.message);

    match &notification.details {
        Some(NotificationDetails::Text(text)) => {
            let _ = write!(out, "\n    {}", palette.muted(text));
        }
        Some(NotificationDetails::Items(items)) => {
            for item in items {
                let _ = write!(out, "\n    {}: {}", item.name, palette.muted(&item.message));
            }
        }
        None => {}
    }
    out
}

pub fn render_import_history(history: &ImportHistory, palette: &Palette) -> String {
    let mut out = String::new();
    for entry in history.entries() {
        let (mark, color) = match entry.status {
            ImportStatus::Success => ("✓", palette.success),
            ImportStatus::Error => ("✗", palette.error),
        };
        let _ = write!(out, "{} {}", palette.paint(mark, color), entry.title);
        if let Some(message) = &entry.message {
            let _ = write!(out, " {}", palette.muted(message));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Prints each notification once, then drops expired ones.
#[derive(Debug, Default)]
pub struct NotificationPrinter {
    shown: HashSet<NotificationId>,
}

impl NotificationPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render notifications not yet shown and prune the queue.
    pub fn flush(&mut self, queue: &mut NotificationQueue, palette: &Palette) -> Vec<String> {
        let lines: Vec<String> = queue
            .active()
            .iter()
            .filter(|n| self.shown.insert(n.id))
            .map(|n| render_notification(n, palette))
            .collect();

        queue.prune_expired(Utc::now());
        let live: HashSet<NotificationId> = queue.active().iter().map(|n| n.id).collect();
        self.shown.retain(|id| live.contains(id));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use simo_core::{DetailItem, NotificationConfig, Severity};

    #[test]
    fn track_listing_strips_prefix_and_marks_current() {
        let palette = Theme::Light.palette();
        let tracks = vec![
            Track::from_filename("12_intro.mp3"),
            Track::from_filename("12_outro.mp3"),
        ];
        let out = render_tracks(&tracks, Some("12_outro.mp3"), &palette);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("1. intro.mp3"));
        assert!(lines[1].starts_with('▶'));
        assert!(!out.contains("12_"));
    }

    #[test]
    fn metadata_falls_back_to_display_name() {
        let palette = Theme::Light.palette();
        let metadata = TrackMetadata {
            artist: Some("Band".to_string()),
            ..TrackMetadata::default()
        };
        let out = render_metadata("4_song.mp3", &metadata, &palette);
        assert!(out.contains("song.mp3"));
        assert!(out.contains("Band"));
        assert!(!out.contains("Album"));
    }

    #[test]
    fn item_details_are_listed() {
        let palette = Theme::Dark.palette();
        let mut queue = NotificationQueue::default();
        queue.push(
            "1 upload(s) failed",
            Severity::Error,
            Some(NotificationDetails::Items(vec![DetailItem {
                name: "3.mp3".to_string(),
                message: "File too large".to_string(),
            }])),
        );
        let out = render_notification(&queue.active()[0], &palette);
        assert!(out.contains("1 upload(s) failed"));
        assert!(out.contains("3.mp3"));
        assert!(out.contains("File too large"));
    }

    #[test]
    fn printer_shows_each_notification_once() {
        let palette = Theme::Light.palette();
        let mut queue = NotificationQueue::new(NotificationConfig::default());
        let mut printer = NotificationPrinter::new();

        queue.push("2 file(s) uploaded", Severity::Success, None);
        assert_eq!(printer.flush(&mut queue, &palette).len(), 1);
        assert!(printer.flush(&mut queue, &palette).is_empty());

        queue.push("Playlist imported", Severity::Info, None);
        let lines = printer.flush(&mut queue, &palette);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Playlist imported"));
    }

    #[test]
    fn printer_prunes_expired() {
        let palette = Theme::Light.palette();
        let mut queue = NotificationQueue::new(NotificationConfig {
            display_timeout: chrono::Duration::zero(),
        });
        let mut printer = NotificationPrinter::new();

        queue.push_at(
            "old",
            Severity::Info,
            None,
            Utc::now() - chrono::Duration::seconds(10),
        );
        assert_eq!(printer.flush(&mut queue, &palette).len(), 1);
        assert!(queue.is_empty());
    }
}
