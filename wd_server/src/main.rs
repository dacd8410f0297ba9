//! Word duel server using the async room actor model.
//!
//! Spawns RoomActor instances managed by RoomManager and serves the duel
//! protocol over HTTP/WebSocket.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use wd_server::{
    api::{self, AppState},
    config::ServerConfig,
};
use word_duel::RoomManager;

const HELP: &str = "\
Run a word duel game server

USAGE:
  wd_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                 Server bind address (e.g., 0.0.0.0:8080)
  PRESSURE_LIMIT              Pressure queue length that loses the game  [default: 10]
  HAND_SIZE                   Attack cards held per player              [default: 3]
  INITIAL_PRESSURE            Pressure entries seeded at game start     [default: 1]
  OPTION_COUNT                Definitions per multiple-choice set       [default: 4]
  ROOM_IDLE_TIMEOUT_SECS      Idle seconds before a room expires        [default: 600]
  ROOM_FINISHED_LINGER_SECS   Linger seconds after a game finishes      [default: 30]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists.
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(bind_override)?;
    info!("Starting word duel server at {}", config.bind);

    let room_manager = Arc::new(RoomManager::new(config.room.clone()));

    let state = AppState { room_manager };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
    }
}
