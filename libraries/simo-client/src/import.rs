//! YouTube playlist import.
//!
//! The server downloads the playlist itself; the client only submits the URL
//! and keeps a local history of what came back.

use crate::error::{ClientError, Result};
use crate::response::{check, send_error};
use crate::types::{ImportRequest, ImportResponse};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use simo_core::{EventBus, UpdateReason};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Import client for the SimoMP3 server.
pub struct ImportClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    token: &'a str,
    events: &'a EventBus,
}

impl<'a> ImportClient<'a> {
    pub(crate) fn new(
        http: &'a Client,
        base_url: &'a str,
        token: &'a str,
        events: &'a EventBus,
    ) -> Self {
        Self {
            http,
            base_url,
            token,
            events,
        }
    }

    /// Ask the server to download a playlist.
    ///
    /// A blank URL fails locally without a request.
    pub async fn import_playlist(&self, playlist_url: &str) -> Result<ImportResponse> {
        let playlist_url = playlist_url.trim();
        if playlist_url.is_empty() {
            return Err(ClientError::Validation(
                "Please enter a playlist URL".to_string(),
            ));
        }

        let url = format!("{}/download-youtube-playlist", self.base_url);
        debug!(url = %url, playlist = %playlist_url, "Importing playlist");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token)
            .json(&ImportRequest { playlist_url })
            .send()
            .await
            .map_err(send_error)?;

        let imported: ImportResponse = check(response).await?.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse import response: {}", e))
        })?;

        info!(
            playlist = %playlist_url,
            downloaded = imported.downloaded.len(),
            "Playlist imported"
        );
        self.events.playlist_updated(UpdateReason::Import);
        Ok(imported)
    }

    /// Import and record the outcome in `history`.
    pub async fn import_into(
        &self,
        playlist_url: &str,
        history: &mut ImportHistory,
    ) -> Result<ImportResponse> {
        match self.import_playlist(playlist_url).await {
            Ok(imported) => {
                history.record_success(&imported);
                Ok(imported)
            }
            // Nothing was sent, nothing to remember
            Err(e @ ClientError::Validation(_)) => Err(e),
            Err(e) => {
                warn!(playlist = %playlist_url, error = %e, "Playlist import failed");
                history.record_failure(playlist_url.trim(), &e.to_string());
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Error,
}

/// One line of the import history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    /// Track title, or `Playlist: <url>` for a failed import
    pub title: String,
    pub status: ImportStatus,
    pub message: Option<String>,
    pub at: DateTime<Utc>,
}

/// Newest-first log of imports for the current run.
#[derive(Debug, Clone, Default)]
pub struct ImportHistory {
    entries: VecDeque<ImportEntry>,
}

impl ImportHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per downloaded title.
    pub fn record_success(&mut self, response: &ImportResponse) {
        let now = Utc::now();
        for title in &response.downloaded {
            self.entries.push_front(ImportEntry {
                title: title.clone(),
                status: ImportStatus::Success,
                message: None,
                at: now,
            });
        }
    }

    pub fn record_failure(&mut self, playlist_url: &str, message: &str) {
        self.entries.push_front(ImportEntry {
            title: format!("Playlist: {}", playlist_url),
            status: ImportStatus::Error,
            message: Some(message.to_string()),
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &ImportEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_newest_first() {
        let mut history = ImportHistory::new();
        history.record_success(&ImportResponse {
            message: "ok".to_string(),
            downloaded: vec!["First".to_string(), "Second".to_string()],
        });
        history.record_failure("https://youtube.com/playlist?list=x", "private playlist");

        let titles: Vec<&str> = history.entries().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Playlist: https://youtube.com/playlist?list=x",
                "Second",
                "First"
            ]
        );

        history.clear();
        assert!(history.is_empty());
    }
}
