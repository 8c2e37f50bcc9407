//! Shared utilities for the Agora relay: logging setup and time helpers.

pub mod logger;
pub mod time;
