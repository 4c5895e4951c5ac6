/// SimoMP3 - command-line music client
use clap::{Parser, Subcommand};
use simo_cli::{commands, player, App, CliConfig, Theme};
use simo_client::ImportHistory;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "simo")]
#[command(about = "SimoMP3 music library client", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SIMO_CONFIG")]
    config: Option<PathBuf>,

    /// Server URL, overrides the configuration file
    #[arg(long, global = true, env = "SIMO_SERVER_URL")]
    server: Option<String>,

    /// Colour theme (light or dark)
    #[arg(long, global = true)]
    theme: Option<Theme>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        username: String,
        /// Password (prompted when omitted)
        #[arg(long, env = "SIMO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        username: String,
        email: String,
        /// Password (prompted twice when omitted)
        #[arg(long, env = "SIMO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// List uploaded tracks
    List,
    /// Upload audio files
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete a track by number or name
    Delete { track: String },
    /// Import a YouTube playlist
    Import { url: String },
    /// Show a track's tags
    Info { track: String },
    /// Open the interactive player
    Play {
        /// Track to start with
        track: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simo_cli=info,simo_client=info,simo_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server.url = server;
    }
    if let Some(theme) = cli.theme {
        config.ui.theme = theme;
    }
    config.validate()?;

    let mut app = App::new(config).await?;

    let result = match cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            commands::login(&mut app, username, password).await
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let (password, confirm) = match password {
                Some(password) => (password.clone(), password),
                None => (prompt("Password: ")?, prompt("Confirm password: ")?),
            };
            commands::register(&mut app, username, email, password, confirm).await
        }
        Commands::Logout => commands::logout(&mut app).await,
        Commands::List => commands::list(&mut app).await,
        Commands::Upload { paths } => commands::upload(&mut app, paths).await,
        Commands::Delete { track } => commands::delete(&mut app, &track).await,
        Commands::Import { url } => {
            commands::import(&mut app, &url, &mut ImportHistory::new()).await
        }
        Commands::Info { track } => commands::info(&mut app, &track).await,
        Commands::Play { track } => player::run(&mut app, track).await,
    };

    let failed = result.is_err();
    if let Err(e) = result {
        app.report(e).await;
    }
    app.flush_notifications();

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
