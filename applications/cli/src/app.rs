//! Shared state of one CLI run

use crate::config::CliConfig;
use crate::output::NotificationPrinter;
use crate::session_store::SessionStore;
use crate::theme::{Palette, Theme};
use simo_audio::AudioError;
use simo_client::{ClientError, SimoClient};
use simo_core::{NotificationQueue, Severity, SimoError};
use simo_playback::PlaybackError;
use tracing::{info, warn};

pub struct App {
    pub config: CliConfig,
    pub client: SimoClient,
    pub store: SessionStore,
    pub notifications: NotificationQueue,
    printer: NotificationPrinter,
    theme: Theme,
}

impl App {
    /// Build the client and reinstall the saved session, if any.
    pub async fn new(config: CliConfig) -> anyhow::Result<Self> {
        let client = SimoClient::new(config.client_config())?;
        let store = SessionStore::new(&config.session.file);

        match store.load().await {
            Ok(Some(session)) => {
                info!(user = ?session.user.as_ref().map(|u| &u.username), "Restored session");
                client.restore(session).await;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable session file"),
        }

        Ok(Self {
            notifications: NotificationQueue::new(config.notification_config()),
            printer: NotificationPrinter::new(),
            theme: config.ui.theme,
            config,
            client,
            store,
        })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notifications.push(message, severity, None);
    }

    /// Turn a failed command into a notification.
    ///
    /// A rejected session also drops the saved token so the next run asks
    /// for a login.
    pub async fn report(&mut self, err: anyhow::Error) {
        let Some(error) = user_facing(err, &mut self.notifications) else {
            return;
        };

        if error.is_authorization() {
            self.client.logout().await;
            if let Err(e) = self.store.clear().await {
                warn!(error = %e, "Failed to clear session file");
            }
        }
        self.notifications.report_error(&error);
    }

    /// Print pending notifications and drop expired ones.
    pub fn flush_notifications(&mut self) {
        let palette = self.palette();
        for line in self.printer.flush(&mut self.notifications, &palette) {
            println!("{}", line);
        }
    }
}

/// Map known crate errors to `SimoError`; anything else is queued as-is.
fn user_facing(err: anyhow::Error, queue: &mut NotificationQueue) -> Option<SimoError> {
    let err = match err.downcast::<ClientError>() {
        Ok(e) => return Some(e.into()),
        Err(err) => err,
    };
    let err = match err.downcast::<PlaybackError>() {
        Ok(e) => return Some(e.into()),
        Err(err) => err,
    };
    let err = match err.downcast::<AudioError>() {
        Ok(e) => return Some(PlaybackError::from(e).into()),
        Err(err) => err,
    };
    match err.downcast::<SimoError>() {
        Ok(e) => Some(e),
        Err(err) => {
            queue.push(format!("{:#}", err), Severity::Error, None);
            None
        }
    }
}
