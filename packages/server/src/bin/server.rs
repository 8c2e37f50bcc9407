//! Agora WebSocket relay server.
//!
//! Relays messages from each client to all other connected clients and
//! announces joins, leaves and liveness timeouts.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-server
//! cargo run --bin agora-server -- --host 0.0.0.0 --port 3000 --ping-interval-secs 10
//! ```

use std::sync::Arc;

use agora_server::{app::build_server, config::ServerArgs};
use agora_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerArgs::parse().into_config();
    tracing::info!(
        "Starting relay (ping interval: {:?}, idle window: {:?})",
        config.ping_interval,
        config.idle_window
    );

    let server = build_server(config, Arc::new(SystemClock));
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
