//! Domain layer for the relay.
//!
//! This module contains the participant model and the interfaces the relay
//! needs from its collaborators (registry, fan-out, transport). Concrete
//! implementations live in the infrastructure layer.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod transport;
pub mod value_object;

pub use entity::{Liveness, Participant};
pub use error::{TransportError, ValueObjectError};
pub use message_pusher::{BroadcastReport, MessagePusher};
pub use repository::{Member, MembershipChange, ParticipantRegistry};
pub use transport::Connection;
pub use value_object::{ConnectionId, DisplayName, ParticipantId, ParticipantIdFactory, Timestamp};

#[cfg(test)]
pub use transport::MockConnection;
