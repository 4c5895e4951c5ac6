//! One-shot subcommands
//!
//! Each command also backs the matching action of the interactive player.

use crate::app::App;
use crate::output::{render_import_history, render_metadata, render_tracks};
use anyhow::{bail, Context};
use simo_client::{
    AuthForm, AuthMode, AuthOutcome, ImportHistory, UploadFile, UploadSequencer, UploadStatus,
};
use simo_core::{Severity, Track};
use std::path::PathBuf;
use tracing::info;

pub async fn login(app: &mut App, username: String, password: String) -> anyhow::Result<()> {
    let mut form = AuthForm::new(AuthMode::Login);
    form.username = username;
    form.password = password;

    let AuthOutcome::LoggedIn(user) = form.submit(&app.client).await? else {
        bail!("unexpected registration outcome");
    };

    if let Some(session) = app.client.session().await {
        app.store.save(&session).await?;
    }
    app.notify(format!("Logged in as {}", user.username), Severity::Success);
    Ok(())
}

pub async fn register(
    app: &mut App,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
) -> anyhow::Result<()> {
    let mut form = AuthForm::new(AuthMode::Register);
    form.username = username;
    form.email = email;
    form.password = password;
    form.confirm_password = confirm_password;

    form.submit(&app.client).await?;
    app.notify(
        format!("Account created, log in with `simo login {}`", form.username),
        Severity::Success,
    );
    Ok(())
}

pub async fn logout(app: &mut App) -> anyhow::Result<()> {
    app.client.logout().await;
    app.store.clear().await?;
    app.notify("Logged out", Severity::Info);
    Ok(())
}

/// Fetch the library, failing early when logged out.
pub async fn fetch_library(app: &App) -> anyhow::Result<Vec<Track>> {
    let tracks = app.client.library().await?.client().list_files().await?;
    Ok(tracks)
}

pub async fn list(app: &mut App) -> anyhow::Result<()> {
    let tracks = fetch_library(app).await?;
    println!("{}", render_tracks(&tracks, None, &app.palette()));
    Ok(())
}

pub async fn upload(app: &mut App, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let handle = app.client.upload().await?;
    let sequencer = UploadSequencer::new().with_events(app.client.events().clone());
    let files: Vec<UploadFile> = paths.into_iter().map(UploadFile::from_path).collect();

    let prepared = sequencer.prepare(files);
    prepared.notify_skipped(&mut app.notifications);
    app.flush_notifications();
    if prepared.is_empty() {
        return Ok(());
    }

    let palette = app.palette();
    let report = sequencer
        .upload_batch(&handle.client(), prepared, |index, total, item| {
            if item.status == UploadStatus::Pending {
                return;
            }
            let status = match &item.message {
                Some(message) => format!("{}: {}", item.status, message),
                None => item.status.to_string(),
            };
            println!(
                "{} {} {}",
                palette.muted(&format!("[{}/{}]", index + 1, total)),
                item.name,
                palette.muted(&status)
            );
        })
        .await;

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped,
        "Upload finished"
    );
    report.notify(&mut app.notifications);
    Ok(())
}

/// Find a track by raw filename, display name or 1-based list position.
pub fn resolve_track<'a>(tracks: &'a [Track], query: &str) -> Option<&'a Track> {
    let query = query.trim();
    if let Ok(index) = query.parse::<usize>() {
        if let Some(track) = index.checked_sub(1).and_then(|i| tracks.get(i)) {
            return Some(track);
        }
    }

    tracks
        .iter()
        .find(|t| t.filename == query)
        .or_else(|| tracks.iter().find(|t| t.display_name() == query))
        .or_else(|| {
            let lower = query.to_lowercase();
            tracks
                .iter()
                .find(|t| t.display_name().to_lowercase().starts_with(&lower))
        })
}

async fn resolve(app: &App, query: &str) -> anyhow::Result<Track> {
    let tracks = fetch_library(app).await?;
    resolve_track(&tracks, query)
        .cloned()
        .with_context(|| format!("no track matches '{}'", query))
}

pub async fn delete(app: &mut App, query: &str) -> anyhow::Result<()> {
    let track = resolve(app, query).await?;
    app.client
        .library()
        .await?
        .client()
        .delete_file(&track.filename)
        .await?;
    app.notify(format!("Deleted {}", track.display_name()), Severity::Success);
    Ok(())
}

pub async fn import(app: &mut App, url: &str, history: &mut ImportHistory) -> anyhow::Result<()> {
    let imported = app
        .client
        .import()
        .await?
        .client()
        .import_into(url, history)
        .await;

    println!("{}", render_import_history(history, &app.palette()));
    let imported = imported?;
    let message = if imported.message.is_empty() {
        format!("{} track(s) imported", imported.downloaded.len())
    } else {
        imported.message
    };
    app.notify(message, Severity::Success);
    Ok(())
}

pub async fn info(app: &mut App, query: &str) -> anyhow::Result<()> {
    let track = resolve(app, query).await?;
    let metadata = app
        .client
        .library()
        .await?
        .client()
        .file_metadata(&track.filename)
        .await?;
    println!("{}", render_metadata(&track.filename, &metadata, &app.palette()));
    Ok(())
}
