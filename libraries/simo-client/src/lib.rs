//! SimoMP3 Client
//!
//! HTTP client library for the SimoMP3 REST API.
//!
//! # Features
//!
//! - **Session**: login, registration with local validation, logout, restore
//! - **Library**: list uploaded files, delete, per-track metadata, audio bytes
//! - **Upload**: sequential batch uploads with per-file status and summary
//!   notifications
//! - **Import**: YouTube playlist download on the server, with history
//!
//! # Example
//!
//! ```ignore
//! use simo_client::{ClientConfig, SimoClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SimoClient::new(ClientConfig::new("http://localhost:5000"))?;
//!
//!     let login = client.login("simo", "secret").await?;
//!     println!("Logged in as {}", login.user.username);
//!
//!     let library = client.library().await?;
//!     let tracks = library.client().list_files().await?;
//!     println!("Found {} tracks", tracks.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod import;
mod library;
mod response;
mod session;
mod types;
mod upload;

// Re-export main types
pub use client::{ImportClientHandle, LibraryClientHandle, SimoClient, UploadClientHandle};
pub use error::{ClientError, Result};
pub use session::{AuthForm, AuthMode, AuthOutcome, Session};
pub use types::{
    ClientConfig, ImportResponse, LoginResponse, RegisterResponse, TrackMetadata,
};

// Re-export sub-clients and batch helpers
pub use import::{ImportClient, ImportEntry, ImportHistory, ImportStatus};
pub use library::LibraryClient;
pub use session::AuthClient;
pub use upload::{
    UploadBatch, UploadClient, UploadData, UploadFile, UploadItem, UploadReport,
    UploadSequencer, UploadStatus, Uploader, DEFAULT_ACCEPTED_EXTENSION,
};
