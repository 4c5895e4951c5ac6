//! Session and authentication for SimoMP3.

use crate::client::SimoClient;
use crate::error::{ClientError, Result};
use crate::response::{check, send_error};
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use simo_core::User;
use tracing::{debug, info, warn};

/// Bearer token plus the identity it belongs to.
///
/// Serializable so front ends can persist it between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

/// Authentication client for the SimoMP3 server.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Login with username and password.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = format!("{}/login", self.base_url);
        debug!(url = %url, username = %username, "Attempting login");

        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(send_error)?;

        let response = check(response).await.map_err(|e| match e {
            ClientError::Authorization(_) => {
                warn!(username = %username, "Login failed: invalid credentials");
                ClientError::Authorization("Invalid username or password".to_string())
            }
            other => other,
        })?;

        let login: LoginResponse = response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse login response: {}", e))
        })?;

        info!(username = %login.user.username, user_id = login.user.id, "Login successful");
        Ok(login)
    }

    /// Create a new account. Does not log in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse> {
        let url = format!("{}/register", self.base_url);
        debug!(url = %url, username = %username, "Registering account");

        let response = self
            .http
            .post(&url)
            .json(&RegisterRequest {
                username,
                email,
                password,
            })
            .send()
            .await
            .map_err(send_error)?;

        let response = check(response).await?;
        let text = response.text().await?;
        let registered = serde_json::from_str(&text).unwrap_or_default();

        info!(username = %username, "Registration successful");
        Ok(registered)
    }

    /// Get the user behind a token.
    pub async fn current_user(&self, token: &str) -> Result<User> {
        let url = format!("{}/me", self.base_url);
        debug!(url = %url, "Getting current user info");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(send_error)?;

        let response = check(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse user info: {}", e)))
    }

    /// Check whether a token is still accepted.
    pub async fn validate_token(&self, token: &str) -> Result<bool> {
        match self.current_user(token).await {
            Ok(_) => Ok(true),
            Err(ClientError::Authorization(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// Login / registration form
// =============================================================================

/// Which form is shown. The two are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// What a successful submit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Logged in; the client now holds the session
    LoggedIn(User),
    /// Account created; the form switched back to login mode
    Registered,
}

/// State of the login/registration form.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    error: Option<String>,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Switch between login and registration. Clears the inline error.
    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
    }

    /// Inline error from the last submit
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Local checks run before any request.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        if self.mode == AuthMode::Register {
            if self.password != self.confirm_password {
                return Err(ClientError::Validation("Passwords do not match".to_string()));
            }
            if !self.email.contains('@') {
                return Err(ClientError::Validation(
                    "A valid email is required".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Validate and submit the form through `client`.
    ///
    /// Failures are also kept as the form's inline error.
    pub async fn submit(&mut self, client: &SimoClient) -> Result<AuthOutcome> {
        self.error = None;
        let result = self.submit_inner(client).await;
        if let Err(e) = &result {
            self.error = Some(e.to_string());
        }
        result
    }

    async fn submit_inner(&mut self, client: &SimoClient) -> Result<AuthOutcome> {
        self.validate()?;

        match self.mode {
            AuthMode::Login => {
                let login = client.login(self.username.trim(), &self.password).await?;
                self.clear_secrets();
                self.username.clear();
                Ok(AuthOutcome::LoggedIn(login.user))
            }
            AuthMode::Register => {
                client
                    .register(self.username.trim(), self.email.trim(), &self.password)
                    .await?;
                // Keep the username so the user can log in right away
                self.clear_secrets();
                self.mode = AuthMode::Login;
                Ok(AuthOutcome::Registered)
            }
        }
    }

    fn clear_secrets(&mut self) {
        self.email.clear();
        self.password.clear();
        self.confirm_password.clear();
    }
}
