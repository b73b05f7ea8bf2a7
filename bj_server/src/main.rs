//! Multiplayer blackjack server.
//!
//! One engine task owns every room and processes inbound events to
//! completion in arrival order; WebSocket connection tasks only move
//! frames in and out. See the `blackjack` crate for the rules.

mod api;
mod config;
mod runtime;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a multiplayer blackjack server

USAGE:
  bj_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  PORT                     Port to listen on (bound to 0.0.0.0)
  RUST_LOG                 Log filter (e.g., info, debug)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let config = config::ServerConfig::load(&mut pargs)?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!("Starting blackjack server at {}", config.bind);

    let engine = runtime::spawn_engine();
    let state = api::AppState { engine };
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
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
