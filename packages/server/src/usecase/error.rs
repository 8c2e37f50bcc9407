//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::ConnectionId;

/// Inbound message could not be relayed
#[derive(Debug, Error)]
pub enum RelayError {
    /// The sender vanished from the registry mid-processing
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("failed to serialize envelope: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Forced disconnect request could not be honored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("userId is required")]
    MissingIdentity,

    #[error("participant '{0}' not found")]
    NotFound(String),
}
