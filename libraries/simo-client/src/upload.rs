//! Track uploads for the SimoMP3 server.
//!
//! [`UploadClient`] sends one file. [`UploadSequencer`] drives a whole
//! batch: it filters by extension, uploads strictly one file at a time in
//! input order and records a status per file. Summary notifications come
//! from the resulting [`UploadReport`].

use crate::error::{ClientError, Result};
use crate::response::{check, send_error};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use simo_core::{
    DetailItem, EventBus, NotificationDetails, NotificationId, NotificationQueue, Severity,
    UpdateReason,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension accepted when none is configured
pub const DEFAULT_ACCEPTED_EXTENSION: &str = "mp3";

/// Where the bytes of an upload come from
#[derive(Debug, Clone)]
pub enum UploadData {
    /// Read from disk when the file's turn comes
    Path(PathBuf),
    /// Already in memory
    Bytes(Bytes),
}

/// One candidate file of a batch.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// File name sent to the server and used for the extension check
    pub name: String,
    pub data: UploadData,
}

impl UploadFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| "track".to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            name,
            data: UploadData::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: UploadData::Bytes(data.into()),
        }
    }

    async fn read(&self) -> Result<Vec<u8>> {
        match &self.data {
            UploadData::Path(path) => Ok(tokio::fs::read(path).await?),
            UploadData::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// Per-file status within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Success => "success",
            Self::Error => "error",
        })
    }
}

/// Status line for one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadItem {
    pub name: String,
    pub status: UploadStatus,
    /// Human-readable failure reason
    pub message: Option<String>,
}

impl UploadItem {
    fn pending(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: UploadStatus::Pending,
            message: None,
        }
    }
}

/// Anything that can push a single file to the server.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> Result<()>;
}

/// Upload client for the SimoMP3 server.
pub struct UploadClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    token: &'a str,
}

impl<'a> UploadClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, token: &'a str) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// Upload one file as the multipart field `file`.
    pub async fn upload_file(&self, file: &UploadFile) -> Result<()> {
        let contents = file.read().await?;
        let size = contents.len();

        debug!(file = %file.name, size, "Uploading file");

        let part = Part::bytes(contents)
            .file_name(file.name.clone())
            .mime_str(mime_type_for_file(Path::new(&file.name)))?;
        let form = Form::new().part("file", part);

        let url = format!("{}/upload", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token)
            .multipart(form)
            .send()
            .await
            .map_err(send_error)?;

        check(response).await?;

        info!(file = %file.name, size, "File uploaded");
        Ok(())
    }
}

#[async_trait]
impl Uploader for UploadClient<'_> {
    async fn upload(&self, file: &UploadFile) -> Result<()> {
        self.upload_file(file).await
    }
}

/// Sequential batch uploader.
#[derive(Debug, Clone)]
pub struct UploadSequencer {
    accepted_extension: String,
    events: Option<EventBus>,
}

impl Default for UploadSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSequencer {
    pub fn new() -> Self {
        Self {
            accepted_extension: DEFAULT_ACCEPTED_EXTENSION.to_string(),
            events: None,
        }
    }

    /// Accept a different extension (without the dot).
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.accepted_extension = extension.trim_start_matches('.').to_lowercase();
        self
    }

    /// Announce successful batches on `events`.
    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn accepted_extension(&self) -> &str {
        &self.accepted_extension
    }

    /// Case-insensitive extension check.
    pub fn accepts(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.accepted_extension))
    }

    /// Split `files` into the ones this sequencer will send and a count of
    /// the rest.
    pub fn prepare(&self, files: Vec<UploadFile>) -> UploadBatch {
        let submitted = files.len();
        let files: Vec<UploadFile> = files.into_iter().filter(|f| self.accepts(&f.name)).collect();
        let skipped = submitted - files.len();

        if files.is_empty() {
            warn!(submitted, "No files with an accepted extension");
        } else if skipped > 0 {
            warn!(skipped, extension = %self.accepted_extension, "Skipping files");
        }

        UploadBatch {
            files,
            skipped,
            accepted_extension: self.accepted_extension.clone(),
        }
    }

    /// Filter and upload in one go.
    ///
    /// Callers that show the skip warning should use [`Self::prepare`] and
    /// [`Self::upload_batch`] so it is queued before the first upload.
    pub async fn run<U, F>(
        &self,
        uploader: &U,
        files: Vec<UploadFile>,
        progress: F,
    ) -> UploadReport
    where
        U: Uploader + ?Sized,
        F: FnMut(usize, usize, &UploadItem),
    {
        self.upload_batch(uploader, self.prepare(files), progress).await
    }

    /// Upload a prepared batch.
    ///
    /// Never fails as a whole: each file ends as `Success` or `Error` and the
    /// next one starts only after that. `progress` sees every item as it
    /// changes, with its index among the accepted files.
    pub async fn upload_batch<U, F>(
        &self,
        uploader: &U,
        batch: UploadBatch,
        mut progress: F,
    ) -> UploadReport
    where
        U: Uploader + ?Sized,
        F: FnMut(usize, usize, &UploadItem),
    {
        let UploadBatch { files, skipped, .. } = batch;
        let total = files.len();

        let mut report = UploadReport {
            items: files.iter().map(|f| UploadItem::pending(&f.name)).collect(),
            skipped,
        };

        if total == 0 {
            return report;
        }

        for (index, item) in report.items.iter().enumerate() {
            progress(index, total, item);
        }

        for (index, file) in files.iter().enumerate() {
            let item = &mut report.items[index];
            item.status = UploadStatus::Uploading;
            progress(index, total, item);

            match uploader.upload(file).await {
                Ok(()) => item.status = UploadStatus::Success,
                Err(e) => {
                    warn!(file = %file.name, error = %e, "Upload failed");
                    item.status = UploadStatus::Error;
                    item.message = Some(failure_message(&e));
                }
            }
            progress(index, total, item);
        }

        info!(
            uploaded = report.succeeded(),
            failed = report.failed(),
            skipped,
            "Upload batch finished"
        );

        if report.succeeded() > 0 {
            if let Some(events) = &self.events {
                events.playlist_updated(UpdateReason::Upload);
            }
        }

        report
    }
}

/// Files that passed the extension filter.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    files: Vec<UploadFile>,
    skipped: usize,
    accepted_extension: String,
}

impl UploadBatch {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files rejected by the extension filter
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Queue the outcome of the extension filter.
    ///
    /// An empty batch yields "No .mp3 files selected"; otherwise a skip
    /// warning when anything was dropped.
    pub fn notify_skipped(&self, queue: &mut NotificationQueue) -> Option<NotificationId> {
        if self.is_empty() {
            return Some(queue.push(
                format!("No .{} files selected", self.accepted_extension),
                Severity::Warning,
                None,
            ));
        }
        (self.skipped > 0).then(|| {
            queue.push(
                format!(
                    "{} file(s) skipped (only .{} accepted)",
                    self.skipped, self.accepted_extension
                ),
                Severity::Warning,
                None,
            )
        })
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Accepted files in input order
    pub items: Vec<UploadItem>,
    /// Files rejected by the extension filter
    pub skipped: usize,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.count(UploadStatus::Success)
    }

    pub fn failed(&self) -> usize {
        self.count(UploadStatus::Error)
    }

    /// Nothing was accepted, so nothing was sent
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether library owners were told to refetch
    pub fn refetch_signalled(&self) -> bool {
        self.succeeded() > 0
    }

    fn count(&self, status: UploadStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }

    /// Queue the batch's summary notifications.
    ///
    /// One success summary and one failure summary listing the failed
    /// files, each only when it applies. Skips are reported by
    /// [`UploadBatch::notify_skipped`] before the batch runs.
    pub fn notify(&self, queue: &mut NotificationQueue) -> Vec<NotificationId> {
        let mut ids = Vec::new();

        let succeeded = self.succeeded();
        if succeeded > 0 {
            ids.push(queue.push(
                format!("{} file(s) uploaded", succeeded),
                Severity::Success,
                None,
            ));
        }

        let failures: Vec<DetailItem> = self
            .items
            .iter()
            .filter(|i| i.status == UploadStatus::Error)
            .map(|i| DetailItem {
                name: i.name.clone(),
                message: i.message.clone().unwrap_or_default(),
            })
            .collect();
        if !failures.is_empty() {
            ids.push(queue.push(
                format!("{} upload(s) failed", failures.len()),
                Severity::Error,
                Some(NotificationDetails::Items(failures)),
            ));
        }

        ids
    }
}

fn failure_message(err: &ClientError) -> String {
    match err {
        ClientError::ServerError { status, message } if message.is_empty() => {
            format!("Upload failed with status {}", status)
        }
        ClientError::ServerError { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// Get MIME type for an audio file.
fn mime_type_for_file(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("m4a" | "aac") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
