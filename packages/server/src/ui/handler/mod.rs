//! Request handlers.

mod http;
mod websocket;

pub use http::{disconnect_participant, health_check, list_participants};
pub use websocket::websocket_handler;
