//! Main SimoMP3 client.

use crate::error::{ClientError, Result};
use crate::import::ImportClient;
use crate::library::LibraryClient;
use crate::session::{AuthClient, Session};
use crate::types::{ClientConfig, LoginResponse, RegisterResponse};
use crate::upload::UploadClient;
use reqwest::Client;
use simo_core::{EventBus, User};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Main client for interacting with a SimoMP3 server.
///
/// The client holds the session and hands out per-area handles that attach
/// the bearer token to every request. Changes to the server-side library
/// (delete, import) are announced on the client's [`EventBus`].
///
/// # Example
///
/// ```ignore
/// use simo_client::{ClientConfig, SimoClient};
///
/// let client = SimoClient::new(ClientConfig::new("http://localhost:5000"))?;
/// client.login("simo", "secret").await?;
///
/// let library = client.library().await?;
/// let tracks = library.client().list_files().await?;
/// println!("Found {} tracks", tracks.len());
/// ```
#[derive(Clone)]
pub struct SimoClient {
    http: Client,
    base_url: Arc<str>,
    session: Arc<RwLock<Option<Session>>>,
    events: EventBus,
}

impl SimoClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_events(config, EventBus::new())
    }

    /// Create a client that publishes on an existing event bus.
    pub fn with_events(config: ClientConfig, events: EventBus) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("SimoMP3/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        let session = config.token.map(|token| Session { token, user: None });

        Ok(Self {
            http,
            base_url: url.into(),
            session: Arc::new(RwLock::new(session)),
            events,
        })
    }

    /// Get the server URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Event bus the client publishes library changes on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Check if the client has a token.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Current user identity, if known.
    pub async fn current_user(&self) -> Option<User> {
        self.session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.user.clone())
    }

    /// Login with username and password.
    ///
    /// On success, the token is stored for subsequent requests.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let response = self.auth().login(username, password).await?;

        *self.session.write().await = Some(Session {
            token: response.token.clone(),
            user: Some(response.user.clone()),
        });

        Ok(response)
    }

    /// Register a new account. The current session is left untouched.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse> {
        self.auth().register(username, email, password).await
    }

    /// Reinstall a persisted session.
    pub async fn restore(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    /// Clear the stored session (logout).
    pub async fn logout(&self) {
        *self.session.write().await = None;
        info!("Logged out");
    }

    /// Check the stored token against the server.
    ///
    /// A rejected token clears the session and yields `Ok(false)`. A valid
    /// one refreshes the stored user identity.
    pub async fn validate_session(&self) -> Result<bool> {
        let Some(token) = self.token().await else {
            return Ok(false);
        };

        match self.auth().current_user(&token).await {
            Ok(user) => {
                if let Some(session) = self.session.write().await.as_mut() {
                    session.user = Some(user);
                }
                Ok(true)
            }
            Err(ClientError::Authorization(_)) => {
                self.logout().await;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Get a library client for listing, deleting and fetching tracks.
    ///
    /// Returns an error if not authenticated.
    pub async fn library(&self) -> Result<LibraryClientHandle> {
        Ok(LibraryClientHandle {
            http: self.http.clone(),
            url: self.base_url.clone(),
            token: self.require_token().await?,
            events: self.events.clone(),
        })
    }

    /// Get an upload client.
    ///
    /// Returns an error if not authenticated.
    pub async fn upload(&self) -> Result<UploadClientHandle> {
        Ok(UploadClientHandle {
            http: self.http.clone(),
            url: self.base_url.clone(),
            token: self.require_token().await?,
        })
    }

    /// Get a playlist import client.
    ///
    /// Returns an error if not authenticated.
    pub async fn import(&self) -> Result<ImportClientHandle> {
        Ok(ImportClientHandle {
            http: self.http.clone(),
            url: self.base_url.clone(),
            token: self.require_token().await?,
            events: self.events.clone(),
        })
    }

    fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(&self.http, &self.base_url)
    }

    async fn token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.token.clone())
    }

    async fn require_token(&self) -> Result<String> {
        self.token().await.ok_or(ClientError::AuthRequired)
    }
}

/// Handle for library operations.
///
/// This is returned by `SimoClient::library()` and provides access to
/// library-related methods.
pub struct LibraryClientHandle {
    http: Client,
    url: Arc<str>,
    token: String,
    events: EventBus,
}

impl LibraryClientHandle {
    /// Get the library client.
    pub fn client(&self) -> LibraryClient<'_> {
        LibraryClient::new(&self.http, &self.url, &self.token, &self.events)
    }
}

/// Handle for upload operations.
pub struct UploadClientHandle {
    http: Client,
    url: Arc<str>,
    token: String,
}

impl UploadClientHandle {
    /// Get the upload client.
    pub fn client(&self) -> UploadClient<'_> {
        UploadClient::new(&self.http, &self.url, &self.token)
    }
}

/// Handle for playlist import operations.
pub struct ImportClientHandle {
    http: Client,
    url: Arc<str>,
    token: String,
    events: EventBus,
}

impl ImportClientHandle {
    /// Get the import client.
    pub fn client(&self) -> ImportClient<'_> {
        ImportClient::new(&self.http, &self.url, &self.token, &self.events)
    }
}
