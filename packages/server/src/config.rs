//! Runtime configuration for the relay server.
//!
//! Values come from command-line flags, fall back to `AGORA_*` environment
//! variables, and finally to the defaults below.

use std::time::Duration;

use clap::Parser;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_IDLE_WINDOW: Duration = Duration::from_secs(30);

/// Relay server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to bind to (`0` picks an ephemeral port)
    pub port: u16,
    /// Period of the liveness monitor
    pub ping_interval: Duration,
    /// Inactivity after which a participant is shown as idle
    pub idle_window: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ping_interval: DEFAULT_PING_INTERVAL,
            idle_window: DEFAULT_IDLE_WINDOW,
        }
    }
}

impl RelayConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Parser, Debug)]
#[command(name = "agora-server")]
#[command(about = "Real-time WebSocket relay with presence and liveness eviction", long_about = None)]
pub struct ServerArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "AGORA_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "AGORA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds between liveness probes
    #[arg(
        long,
        env = "AGORA_PING_INTERVAL_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub ping_interval_secs: u64,

    /// Seconds of inactivity before a participant is shown as idle
    #[arg(
        long,
        env = "AGORA_IDLE_WINDOW_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub idle_window_secs: u64,
}

impl ServerArgs {
    pub fn into_config(self) -> RelayConfig {
        RelayConfig {
            host: self.host,
            port: self.port,
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            idle_window: Duration::from_secs(self.idle_window_secs),
        }
    }
}
