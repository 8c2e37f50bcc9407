//! Infrastructure layer: concrete implementations of the domain interfaces.

pub mod connection;
pub mod dto;
pub mod message_pusher;
pub mod repository;
