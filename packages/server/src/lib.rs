//! Agora relay server library.
//!
//! A real-time WebSocket relay: every connection is registered as a
//! participant, inbound messages are normalized and fanned out to everyone
//! else, presence changes are announced, and unresponsive connections are
//! evicted by a periodic liveness probe.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// wiring
pub mod app;
pub mod config;
