/// Command-line client configuration
use crate::error::{CliError, Result};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use simo_client::ClientConfig;
use simo_core::NotificationConfig;
use simo_playback::PlaybackConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "simo.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_session")]
    pub session: SessionSettings,

    #[serde(default = "default_player")]
    pub player: PlayerSettings,

    #[serde(default = "default_ui")]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Where the login token is kept between runs
    #[serde(default = "default_session_file")]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiSettings {
    #[serde(default)]
    pub theme: Theme,

    #[serde(default = "default_notification_timeout_secs")]
    pub notification_timeout_secs: u64,
}

impl CliConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `simo.toml` is read when
    /// present. `SIMO_`-prefixed variables override the file, with `__`
    /// between section and key (`SIMO_SERVER__URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SIMO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(CliError::Config(
                "server URL is required (set SIMO_SERVER_URL)".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.player.initial_volume) {
            return Err(CliError::Config(format!(
                "initial volume must be between 0 and 1, got {}",
                self.player.initial_volume
            )));
        }

        if self.player.sample_interval_ms == 0 {
            return Err(CliError::Config(
                "sample interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.server.timeout_secs),
            ..ClientConfig::new(self.server.url.trim())
        }
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            sample_interval: Duration::from_millis(self.player.sample_interval_ms),
            volume: self.player.initial_volume,
            ..PlaybackConfig::default()
        }
    }

    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            display_timeout: i64::try_from(self.ui.notification_timeout_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
        }
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: default_url(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_session() -> SessionSettings {
    SessionSettings {
        file: default_session_file(),
    }
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".simo-session.json")
}

fn default_player() -> PlayerSettings {
    PlayerSettings {
        sample_interval_ms: default_sample_interval_ms(),
        initial_volume: default_initial_volume(),
    }
}

fn default_sample_interval_ms() -> u64 {
    1000
}

fn default_initial_volume() -> f32 {
    0.7
}

fn default_ui() -> UiSettings {
    UiSettings {
        theme: Theme::default(),
        notification_timeout_secs: default_notification_timeout_secs(),
    }
}

fn default_notification_timeout_secs() -> u64 {
    5
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            session: default_session(),
            player: default_player(),
            ui: default_ui(),
        }
    }
}
