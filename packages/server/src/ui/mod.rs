//! Relay server: HTTP routing, WebSocket sessions and lifecycle.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
