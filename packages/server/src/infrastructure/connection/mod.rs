//! Transport adapters implementing the domain `Connection` trait.
//!
//! - `websocket`: WebSocket を使った実装

pub mod websocket;

pub use websocket::{OutboundChannel, OutboundFrame, WebSocketConnection};
