//! Login session persisted between runs

use crate::error::{CliError, Result};
use simo_client::Session;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON file holding the token and user of the last login.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved session. A missing file means logged out.
    pub async fn load(&self) -> Result<Option<Session>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = serde_json::from_str(&contents).map_err(|e| {
            CliError::SessionFile(format!("{}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), "Loaded session");
        Ok(Some(session))
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), "Saved session");
        Ok(())
    }

    /// Delete the saved session. Already gone is fine.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
