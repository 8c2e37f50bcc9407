//! Transport collaborator contract.
//!
//! The relay never touches sockets directly. Each accepted connection is
//! represented by an implementation of [`Connection`], owned by the transport
//! layer and shared with the registry as `Arc<dyn Connection>`.

#[cfg(test)]
use mockall::automock;

use super::{error::TransportError, value_object::ConnectionId};

/// A bidirectional connection as seen by the relay.
#[cfg_attr(test, automock)]
pub trait Connection: Send + Sync {
    /// Stable handle used as the registry key
    fn id(&self) -> ConnectionId;

    /// Whether the connection is open and ready to accept frames
    fn is_open(&self) -> bool;

    /// Queue a serialized payload for delivery (fire-and-forget)
    fn send(&self, payload: &str) -> Result<(), TransportError>;

    /// Issue a liveness probe; the acknowledgment arrives asynchronously
    fn ping(&self) -> Result<(), TransportError>;

    /// Close gracefully with a close code and reason
    fn close(&self, code: u16, reason: &str) -> Result<(), TransportError>;

    /// Tear the connection down without a closing handshake
    fn terminate(&self);
}
