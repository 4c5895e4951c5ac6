//! Interactive player
//!
//! Reads one command per line from stdin while following the engine's
//! events. A background task refetches the library into the engine whenever
//! an upload, delete or import changes it.

use crate::app::App;
use crate::commands::{self, fetch_library, resolve_track};
use crate::output::{render_metadata, render_tracks};
use anyhow::Context;
use simo_audio::RemoteSoundLoader;
use simo_client::SimoClient;
use simo_core::{display_name, AppEvent, Severity, SimoError};
use simo_playback::{format_time, PlaybackEngine, PlaybackEvent, PlaybackState, RepeatMode};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const HELP: &str = "\
  p                 play/pause
  n / b             next / previous
  s                 stop
  play <track>      play by number or name
  seek <secs>       jump within the track
  vol <0-1>         set volume
  mute              toggle mute
  shuffle           toggle shuffle
  repeat [mode]     cycle repeat, or set none/all/one
  list              show the library
  status            show what is playing
  info [track]      show tags
  upload <path..>   upload files
  delete <track>    delete a track
  theme             switch light/dark
  help              show this help
  q                 quit";

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    Next,
    Previous,
    Stop,
    Play(String),
    Seek(f64),
    Volume(f32),
    Mute,
    Shuffle,
    /// `None` cycles to the next mode
    Repeat(Option<RepeatMode>),
    List,
    Status,
    Info(Option<String>),
    Upload(Vec<PathBuf>),
    Delete(String),
    Theme,
    Help,
    Quit,
}

impl FromStr for PlayerCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let required = |usage: &str| -> Result<String, String> {
            if arg.is_empty() {
                Err(format!("usage: {}", usage))
            } else {
                Ok(arg.to_string())
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "p" | "pause" | "toggle" => Ok(Self::TogglePlay),
            "n" | "next" => Ok(Self::Next),
            "b" | "prev" | "previous" => Ok(Self::Previous),
            "s" | "stop" => Ok(Self::Stop),
            "play" if arg.is_empty() => Ok(Self::TogglePlay),
            "play" => Ok(Self::Play(arg.to_string())),
            "seek" => {
                let secs = required("seek <secs>")?;
                secs.parse()
                    .map(Self::Seek)
                    .map_err(|_| format!("not a number of seconds: {}", secs))
            }
            "vol" | "volume" => {
                let level = required("vol <0-1>")?;
                match level.parse::<f32>() {
                    Ok(v) if (0.0..=1.0).contains(&v) => Ok(Self::Volume(v)),
                    _ => Err(format!("volume must be between 0 and 1: {}", level)),
                }
            }
            "mute" => Ok(Self::Mute),
            "shuffle" => Ok(Self::Shuffle),
            "repeat" if arg.is_empty() => Ok(Self::Repeat(None)),
            "repeat" => arg.parse().map(|mode| Self::Repeat(Some(mode))),
            "list" | "ls" => Ok(Self::List),
            "status" => Ok(Self::Status),
            "info" => Ok(Self::Info((!arg.is_empty()).then(|| arg.to_string()))),
            "upload" => {
                let paths = required("upload <path..>")?;
                Ok(Self::Upload(
                    paths.split_whitespace().map(PathBuf::from).collect(),
                ))
            }
            "delete" | "rm" => required("delete <track>").map(Self::Delete),
            "theme" => Ok(Self::Theme),
            "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {} (try `help`)", other)),
        }
    }
}

/// Refetch the library into the engine whenever it changes on the server.
///
/// Fetch failures are forwarded on `failures` for the foreground to report.
pub fn spawn_library_sync(
    client: SimoClient,
    engine: PlaybackEngine,
    failures: mpsc::UnboundedSender<SimoError>,
) -> JoinHandle<()> {
    let mut events = client.events().subscribe();

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AppEvent::PlaylistUpdated { reason }) => {
                    debug!(?reason, "Library changed, refetching");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed library events, refetching");
                }
                Err(RecvError::Closed) => break,
            }

            let fetched = match client.library().await {
                Ok(handle) => handle.client().list_files().await,
                Err(e) => Err(e),
            };
            match fetched {
                Ok(tracks) => engine.set_library(tracks).await,
                Err(e) => {
                    if failures.send(e.into()).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Run the interactive player until `q` or end of input.
pub async fn run(app: &mut App, start: Option<String>) -> anyhow::Result<()> {
    let tracks = fetch_library(app).await?;
    info!(tracks = tracks.len(), "Starting player");

    let loader = Arc::new(RemoteSoundLoader::new(app.client.clone()));
    let engine = PlaybackEngine::new(loader, app.config.playback_config());
    engine.set_library(tracks).await;

    let (failures_tx, mut failures) = mpsc::unbounded_channel();
    let sync = spawn_library_sync(app.client.clone(), engine.clone(), failures_tx);
    let mut playback = engine.subscribe();

    println!("{}", render_tracks(&engine.tracks().await, None, &app.palette()));
    println!("{}", app.palette().muted("Type `help` for commands"));

    if let Some(query) = start {
        dispatch(app, &engine, PlayerCommand::Play(query)).await;
    }
    app.flush_notifications();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<PlayerCommand>() {
                    Ok(PlayerCommand::Quit) => break,
                    Ok(command) => dispatch(app, &engine, command).await,
                    Err(usage) => app.notify(usage, Severity::Warning),
                }
            }
            event = playback.recv() => match event {
                Ok(event) => on_playback_event(app, event).await,
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Playback events lagged"),
                Err(RecvError::Closed) => break,
            },
            Some(error) = failures.recv() => app.report(error.into()).await,
        }
        app.flush_notifications();
    }

    sync.abort();
    engine.stop().await;
    Ok(())
}

/// Run one command, turning its failure into a notification.
pub async fn dispatch(app: &mut App, engine: &PlaybackEngine, command: PlayerCommand) {
    if let Err(e) = execute(app, engine, command).await {
        app.report(e).await;
    }
}

async fn execute(
    app: &mut App,
    engine: &PlaybackEngine,
    command: PlayerCommand,
) -> anyhow::Result<()> {
    match command {
        PlayerCommand::TogglePlay => engine.toggle_play().await?,
        PlayerCommand::Next => {
            if engine.next().await?.is_none() {
                app.notify("End of queue", Severity::Info);
            }
        }
        PlayerCommand::Previous => {
            if engine.previous().await?.is_none() {
                app.notify("Start of queue", Severity::Info);
            }
        }
        PlayerCommand::Stop => engine.stop().await,
        PlayerCommand::Play(query) => {
            let tracks = engine.tracks().await;
            let track = resolve_track(&tracks, &query)
                .with_context(|| format!("no track matches '{}'", query))?;
            engine.play(&track.filename).await?;
        }
        PlayerCommand::Seek(secs) => engine.seek(secs).await?,
        PlayerCommand::Volume(level) => engine.set_volume(level).await,
        PlayerCommand::Mute => engine.toggle_mute().await,
        PlayerCommand::Shuffle => {
            let enabled = engine.toggle_shuffle().await;
            app.notify(
                format!("Shuffle {}", if enabled { "on" } else { "off" }),
                Severity::Info,
            );
        }
        PlayerCommand::Repeat(mode) => {
            let mode = match mode {
                Some(mode) => {
                    engine.set_repeat(mode).await;
                    mode
                }
                None => engine.cycle_repeat().await,
            };
            app.notify(format!("Repeat: {}", mode), Severity::Info);
        }
        PlayerCommand::List => {
            let current = engine.current_track().await;
            let tracks = engine.effective_sequence().await;
            println!(
                "{}",
                render_tracks(&tracks, current.as_deref(), &app.palette())
            );
        }
        PlayerCommand::Status => println!("{}", status_line(app, engine).await),
        PlayerCommand::Info(query) => {
            let query = match query {
                Some(query) => query,
                None => engine
                    .current_track()
                    .await
                    .context("nothing is playing")?,
            };
            commands::info(app, &query).await?;
        }
        PlayerCommand::Upload(paths) => commands::upload(app, paths).await?,
        PlayerCommand::Delete(query) => commands::delete(app, &query).await?,
        PlayerCommand::Theme => {
            let theme = app.theme().toggle();
            app.set_theme(theme);
            app.notify(format!("Theme: {}", theme), Severity::Info);
        }
        PlayerCommand::Help => println!("{}", HELP),
        PlayerCommand::Quit => {}
    }
    Ok(())
}

async fn status_line(app: &App, engine: &PlaybackEngine) -> String {
    let palette = app.palette();
    let session = engine.session().await;
    let state = match session.state {
        PlaybackState::Stopped => "stopped",
        PlaybackState::Loading => "loading",
        PlaybackState::Playing => "playing",
        PlaybackState::Paused => "paused",
    };
    let track = session
        .current_track
        .as_deref()
        .map_or("-", display_name);
    let volume = if engine.is_muted().await {
        "muted".to_string()
    } else {
        format!("{:.0}%", engine.volume().await * 100.0)
    };

    format!(
        "{} {} {}/{}  {}",
        palette.accent(track),
        palette.muted(state),
        format_time(session.current_time),
        format_time(session.duration),
        palette.muted(&format!(
            "vol {} | shuffle {} | repeat {}",
            volume,
            if engine.shuffle_enabled().await { "on" } else { "off" },
            engine.repeat_mode().await
        )),
    )
}

/// Print what the engine did on its own.
pub async fn on_playback_event(app: &mut App, event: PlaybackEvent) {
    let palette = app.palette();
    match event {
        PlaybackEvent::TrackChanged {
            filename: Some(filename),
            ..
        } => {
            println!(
                "{} {}",
                palette.muted("Now playing"),
                palette.accent(display_name(&filename))
            );
            show_tags(app, &filename).await;
        }
        PlaybackEvent::TrackChanged { filename: None, .. } => {
            println!("{}", palette.muted("Stopped"));
        }
        PlaybackEvent::StateChanged {
            state: PlaybackState::Paused,
        } => println!("{}", palette.muted("Paused")),
        PlaybackEvent::VolumeChanged { level, muted } => {
            let label = if muted {
                "Volume muted".to_string()
            } else {
                format!("Volume {:.0}%", level * 100.0)
            };
            println!("{}", palette.muted(&label));
        }
        PlaybackEvent::Error {
            filename,
            message,
            unauthorized,
        } => {
            let error = if unauthorized {
                SimoError::Authorization(message)
            } else {
                SimoError::Playback(format!(
                    "Could not play {}: {}",
                    display_name(&filename),
                    message
                ))
            };
            app.report(error.into()).await;
        }
        PlaybackEvent::StateChanged { .. }
        | PlaybackEvent::PositionUpdate { .. }
        | PlaybackEvent::TrackFinished { .. } => {}
    }
}

/// Print the tags of a newly started track. Missing tags are not an error.
async fn show_tags(app: &App, filename: &str) {
    let metadata = match app.client.library().await {
        Ok(handle) => handle.client().file_metadata(filename).await,
        Err(e) => Err(e),
    };
    match metadata {
        Ok(metadata) => println!("{}", render_metadata(filename, &metadata, &app.palette())),
        Err(e) => debug!(filename, error = %e, "No tags for track"),
    }
}
