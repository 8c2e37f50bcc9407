//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket envelopes (system / chat / error)
//! - `http`: HTTP API response DTOs
//! - `normalizer`: inbound payload → outbound chat envelope

pub mod http;
pub mod normalizer;
pub mod websocket;
