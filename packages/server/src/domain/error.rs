//! Domain error types.

use thiserror::Error;

/// Errors raised while constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("participant id must not be empty")]
    ParticipantIdEmpty,

    #[error("participant id is too long ({0} bytes)")]
    ParticipantIdTooLong(usize),
}

/// Errors raised by a transport connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection is closed or closing
    #[error("connection {0} is closed")]
    Closed(String),

    /// The frame could not be handed to the transport
    #[error("failed to send on connection {connection}: {reason}")]
    SendFailed { connection: String, reason: String },
}
