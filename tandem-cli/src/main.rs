use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use std::io::BufRead;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tandem_client::{ClientConfig, Role, Session, SessionState};
use tandem_core::RoomCode;
use tandem_server::RelayConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(33);

#[derive(Parser)]
#[command(name = "tandem", version, about = "Room-code peer-to-peer sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay {
        #[arg(long, env = "TANDEM_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        /// Seconds between keep-alive pings.
        #[arg(long, env = "TANDEM_HEARTBEAT", default_value_t = 20)]
        heartbeat: u64,
    },
    /// Open a room and wait for a peer.
    Host {
        #[arg(long, env = "TANDEM_SIGNAL_URL")]
        signal: Option<String>,

        /// Use this code instead of a generated one.
        #[arg(long, env = "TANDEM_ROOM")]
        room: Option<String>,
    },
    /// Join a room opened by a host.
    Join {
        #[arg(env = "TANDEM_ROOM")]
        room: Option<String>,

        #[arg(long, env = "TANDEM_SIGNAL_URL")]
        signal: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,webrtc=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match Cli::parse().command {
        Commands::Relay { bind, heartbeat } => {
            println!("{}", "📡 Starting tandem relay...".green().bold());
            if heartbeat == 0 {
                warn!("Heartbeat of 0s is not allowed, using 1s");
            }
            let config = RelayConfig {
                bind,
                heartbeat: Duration::from_secs(heartbeat.max(1)),
            };
            runtime.block_on(tandem_server::serve(config))
        }
        Commands::Host { signal, room } => {
            let room = match room {
                Some(room) => RoomCode::parse(&room)?,
                None => RoomCode::generate(),
            };
            println!("{} {}", "🔑 Room code:".cyan(), room.as_str().bold());
            run_session(&runtime, client_config(signal), Role::Host, room.as_str())
        }
        Commands::Join { room, signal } => {
            let room = match room {
                Some(room) => room,
                None => Input::<String>::new()
                    .with_prompt("Room code")
                    .interact_text()
                    .context("Failed to read room code")?,
            };
            run_session(&runtime, client_config(signal), Role::Joiner, &room)
        }
    }
}

fn client_config(signal: Option<String>) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(url) = signal {
        config.signal_url = url;
    }
    config
}

/// Fixed-tick consumer loop: stdin lines go out, peer messages get printed.
fn run_session(
    runtime: &tokio::runtime::Runtime,
    config: ClientConfig,
    role: Role,
    room: &str,
) -> Result<()> {
    let mut session = Session::connect(runtime.handle(), config, role, room)?;
    println!(
        "{}",
        format!("⏳ Connecting to room {} as {}...", session.room(), role).cyan()
    );

    let lines = spawn_stdin_reader();
    let mut last_state = SessionState::Init;

    loop {
        let tick = Instant::now();

        let state = session.state();
        if state != last_state {
            info!("Session state: {} -> {}", last_state, state);
            report_state(state);
            last_state = state;
        }

        if state == SessionState::Failed {
            match session.take_failure() {
                Some(failure) => bail!("Session failed: {}", failure),
                None => bail!("Session failed"),
            }
        }
        if state == SessionState::Closed {
            return Ok(());
        }

        for message in session.drain() {
            println!("{} {}", "peer>".magenta().bold(), message);
        }

        loop {
            match lines.try_recv() {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) if line.trim() == "/quit" => {
                    println!("{}", "👋 Closing session".yellow());
                    session.close();
                    return Ok(());
                }
                Ok(line) => {
                    if !session.is_open() {
                        println!("{}", "(queued until the channel opens)".dimmed());
                    }
                    session.send(line);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    println!("{}", "👋 Closing session".yellow());
                    session.close();
                    return Ok(());
                }
            }
        }

        if let Some(rest) = TICK.checked_sub(tick.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

fn report_state(state: SessionState) {
    match state {
        SessionState::Connected => {
            println!("{}", "✨ Connected! Type a line to send it.".green().bold())
        }
        SessionState::Failed | SessionState::Closed => {}
        other => println!("{} {}", "•".dimmed(), other.to_string().dimmed()),
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
