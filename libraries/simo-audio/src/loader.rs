//! Sound loader backed by the SimoMP3 REST client

use crate::decoder::{extension_of, probe};
use crate::error::AudioError;
use crate::sound::ClockedSound;
use async_trait::async_trait;
use simo_client::SimoClient;
use simo_playback::{PlaybackError, SoundHandle, SoundLoader};
use tracing::{debug, instrument};

/// Fetches `/uploads/{filename}` with the session token and probes the bytes
#[derive(Clone)]
pub struct RemoteSoundLoader {
    client: SimoClient,
}

impl RemoteSoundLoader {
    pub fn new(client: SimoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SoundLoader for RemoteSoundLoader {
    #[instrument(skip(self))]
    async fn load(&self, filename: &str) -> simo_playback::Result<Box<dyn SoundHandle>> {
        let handle = self.client.library().await.map_err(AudioError::from)?;
        let data = handle
            .client()
            .fetch_audio(filename)
            .await
            .map_err(AudioError::from)?;

        debug!(bytes = data.len(), "Fetched audio");

        let extension = extension_of(filename);
        let info = tokio::task::spawn_blocking(move || probe(data, extension.as_deref()))
            .await
            .map_err(|e| PlaybackError::Load(format!("Probe task failed: {}", e)))??;

        debug!(duration = info.duration, "Probed audio");
        Ok(Box::new(ClockedSound::new(info)))
    }
}
