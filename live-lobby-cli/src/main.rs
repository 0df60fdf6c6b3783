use clap::{Parser, Subcommand};
use live_lobby_cli::{wire_schemas, write_schemas, CliError, ConsoleObserver, LogConfig, Result};
use live_lobby_client::{connect, spawn_observer, ClientConfig, SessionConfig, SessionState};
use live_lobby_server::{LobbyServer, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "live-lobby")]
#[command(version, about = "Live lobby client and reference server")]
struct Cli {
    /// Debug-level logging for the lobby crates
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Write a Chrome trace (needs the chrome-trace feature)
    #[arg(long, global = true)]
    chrome_trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a lobby and follow its membership until Ctrl+C
    Join {
        /// Lobby to join
        #[arg(short, long)]
        lobby: String,

        /// Your user ID
        #[arg(short, long)]
        user: String,

        /// Name shown to other participants (defaults to the user ID)
        #[arg(short = 'n', long)]
        display_name: Option<String>,

        /// Join as coordinator
        #[arg(long)]
        coordinator: bool,

        /// Start the activity right after joining (coordinators only)
        #[arg(long, requires = "coordinator")]
        start: bool,

        /// Membership store base URL
        #[arg(long, env = "LIVE_LOBBY_API", default_value = "http://127.0.0.1:3000")]
        api: String,

        /// Event channel WebSocket URL
        #[arg(long, env = "LIVE_LOBBY_EVENTS", default_value = "ws://127.0.0.1:3000/events")]
        events: String,

        /// Bearer token for the membership store
        #[arg(long, env = "LIVE_LOBBY_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },

    /// Run the in-memory reference server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },

    /// Print the JSON schemas of the wire types
    Schema {
        /// Write one file per type into this directory instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = if cli.verbose {
        LogConfig::dev()
    } else {
        LogConfig::default()
    };
    if cli.json_logs {
        log_config = log_config.with_json();
    }
    if cli.chrome_trace {
        log_config = log_config.with_chrome_trace();
    }
    let _log_guard = log_config.init()?;

    match cli.command {
        Commands::Join {
            lobby,
            user,
            display_name,
            coordinator,
            start,
            api,
            events,
            token,
            timeout,
        } => {
            let mut client = ClientConfig::new(api, events)
                .with_request_timeout(Duration::from_secs(timeout));
            if let Some(token) = token {
                client = client.with_auth_token(token);
            }

            let mut session = if coordinator {
                SessionConfig::coordinator(lobby, user)
            } else {
                SessionConfig::member(lobby, user)
            };
            if let Some(name) = display_name {
                session = session.with_display_name(name);
            }

            join_lobby(client, session, start).await?;
        }
        Commands::Serve { bind } => serve(bind).await?,
        Commands::Schema { output } => match output {
            Some(dir) => {
                let written = write_schemas(&dir)?;
                info!("Wrote {} schemas to {}", written.len(), dir.display());
            }
            None => println!("{}", serde_json::to_string_pretty(&wire_schemas()?)?),
        },
    }

    Ok(())
}

async fn join_lobby(client: ClientConfig, config: SessionConfig, start: bool) -> Result<()> {
    let (session, events) = connect(&client, config)?;
    let observer = spawn_observer(events, ConsoleObserver::new());

    info!(
        "Joining lobby '{}' as '{}' ({})",
        session.lobby_id(),
        session.user_id(),
        session.role()
    );

    let outcome = async {
        session.start().await?;
        info!("🟢 Joined with {} participant(s)", session.view().len());

        if start {
            session.request_start().await?;
            info!("📢 Start requested");
        }
        Ok::<_, CliError>(())
    }
    .await;

    if outcome.is_ok() {
        info!("Press Ctrl+C to leave");
        tokio::signal::ctrl_c().await?;
        info!("");
        info!("Shutting down...");
    }

    session.teardown().await;
    let final_state = session.state();
    drop(session);

    match tokio::time::timeout(Duration::from_secs(1), observer).await {
        Ok(Ok(console)) if console.has_started() => info!("Activity had started"),
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("Observer task failed: {}", e),
        Err(_) => warn!("Observer did not finish in time"),
    }

    if final_state != SessionState::Left && final_state != SessionState::Started {
        warn!("Session ended in state {}", final_state);
    }
    outcome
}

async fn serve(bind: SocketAddr) -> Result<()> {
    let server = LobbyServer::bind(ServerConfig::new(bind)).await?;
    info!("🚀 Serving REST on http://{0} and events on ws://{0}/events", server.local_addr()?);
    info!("Press Ctrl+C to stop");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await?;
    Ok(())
}
