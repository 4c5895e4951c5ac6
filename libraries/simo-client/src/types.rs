//! Types for SimoMP3 API requests and responses.

use serde::{Deserialize, Serialize};
use simo_core::{Track, User};
use std::time::Duration;

/// Configuration for connecting to a SimoMP3 server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server (e.g., "http://localhost:5000")
    pub url: String,
    /// Bearer token from a previous session
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new client config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a config with an existing token.
    pub fn with_token(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(url)
        }
    }
}

// =============================================================================
// Session Types
// =============================================================================

/// Request body for the login endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

/// Request body for the registration endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from successful registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// Library Types
// =============================================================================

/// One entry of `GET /files`.
///
/// Older servers list bare filenames, newer ones full records.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum FileEntry {
    Record(Track),
    Name(String),
}

impl From<FileEntry> for Track {
    fn from(entry: FileEntry) -> Self {
        match entry {
            FileEntry::Record(track) => track,
            FileEntry::Name(name) => Track::from_filename(name),
        }
    }
}

/// Tag metadata from `GET /file-metadata/:filename`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
    pub genre: Option<String>,
    /// Artwork URL or data URI
    pub artwork: Option<String>,
}

/// Tag readers report years either as text or as a number.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

// =============================================================================
// Import Types
// =============================================================================

/// Request body for the YouTube playlist import.
#[derive(Debug, Serialize)]
pub(crate) struct ImportRequest<'a> {
    pub playlist_url: &'a str,
}

/// Response from a successful import.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub message: String,
    /// Titles of the downloaded tracks
    #[serde(default)]
    pub downloaded: Vec<String>,
}

// =============================================================================
// Error Types
// =============================================================================

/// API error body returned by the server.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_entries_accept_both_shapes() {
        let entries: Vec<FileEntry> = serde_json::from_str(
            r#"[{"filename": "1_a.mp3", "originalName": "a.mp3", "uploadDate": null}, "1_b.mp3"]"#,
        )
        .unwrap();
        let tracks: Vec<Track> = entries.into_iter().map(Track::from).collect();

        assert_eq!(tracks[0].filename, "1_a.mp3");
        assert_eq!(tracks[1].filename, "1_b.mp3");
        assert_eq!(tracks[1].original_name, "b.mp3");
    }

    #[test]
    fn metadata_year_is_optional() {
        let meta: TrackMetadata =
            serde_json::from_str(r#"{"title": "Song", "artist": "Someone"}"#).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Song"));
        assert!(meta.year.is_none());

        let meta: TrackMetadata = serde_json::from_str(r#"{"year": 1999}"#).unwrap();
        assert_eq!(meta.year.as_deref(), Some("1999"));
    }

    #[test]
    fn login_response_accepts_access_token_alias() {
        let login: LoginResponse = serde_json::from_str(
            r#"{"access_token": "t", "user": {"id": 1, "username": "simo"}}"#,
        )
        .unwrap();
        assert_eq!(login.token, "t");
    }
}
