//! Library operations for the SimoMP3 server.

use crate::error::{ClientError, Result};
use crate::response::{check, send_error};
use crate::types::{FileEntry, TrackMetadata};
use bytes::Bytes;
use reqwest::Client;
use simo_core::{EventBus, Track, UpdateReason};
use tracing::{debug, info};

/// Library client for the SimoMP3 server.
///
/// Filenames are always sent raw; the numeric owner prefix is only stripped
/// for display.
pub struct LibraryClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    token: &'a str,
    events: &'a EventBus,
}

impl<'a> LibraryClient<'a> {
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

    /// Get the user's uploaded files in server order.
    pub async fn list_files(&self) -> Result<Vec<Track>> {
        let url = format!("{}/files", self.base_url);
        debug!(url = %url, "Fetching library");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token)
            .send()
            .await
            .map_err(send_error)?;

        let entries: Vec<FileEntry> = check(response).await?.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse file list: {}", e))
        })?;

        let tracks: Vec<Track> = entries.into_iter().map(Track::from).collect();
        debug!(tracks = tracks.len(), "Fetched library");
        Ok(tracks)
    }

    /// Delete a file and announce the library change.
    pub async fn delete_file(&self, filename: &str) -> Result<()> {
        let url = format!("{}/delete/{}", self.base_url, encode_segment(filename));
        debug!(url = %url, filename = %filename, "Deleting file");

        let response = self
            .http
            .delete(&url)
            .bearer_auth(self.token)
            .send()
            .await
            .map_err(send_error)?;

        check(response).await?;

        info!(filename = %filename, "File deleted");
        self.events.playlist_updated(UpdateReason::Delete);
        Ok(())
    }

    /// Download the audio bytes of a file.
    pub async fn fetch_audio(&self, filename: &str) -> Result<Bytes> {
        let url = format!("{}/uploads/{}", self.base_url, encode_segment(filename));
        debug!(url = %url, "Fetching audio");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token)
            .send()
            .await
            .map_err(send_error)?;

        let bytes = check(response).await?.bytes().await?;
        debug!(filename = %filename, size = bytes.len(), "Fetched audio");
        Ok(bytes)
    }

    /// Get the tag metadata the server extracted for a file.
    pub async fn file_metadata(&self, filename: &str) -> Result<TrackMetadata> {
        let url = format!(
            "{}/file-metadata/{}",
            self.base_url,
            encode_segment(filename)
        );
        debug!(url = %url, "Fetching metadata");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token)
            .send()
            .await
            .map_err(send_error)?;

        check(response).await?.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse metadata: {}", e))
        })
    }
}

/// Percent-encode one URL path segment.
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        // form encoding turns spaces into '+', paths need %20
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_encoded() {
        assert_eq!(encode_segment("3_song.mp3"), "3_song.mp3");
        assert_eq!(encode_segment("3_my song.mp3"), "3_my%20song.mp3");
        assert_eq!(encode_segment("a/b#c.mp3"), "a%2Fb%23c.mp3");
    }
}
