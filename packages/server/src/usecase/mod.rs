//! UseCase layer: the relay's lifecycle operations.
//!
//! Each use case depends only on the domain interfaces (registry, fan-out,
//! transport) and is wired to concrete implementations at startup.

mod connect_participant;
mod disconnect_participant;
mod error;
mod list_participants;
mod monitor_liveness;
mod relay_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::{
    DisconnectParticipantUseCase, FORCED_CLOSE_CODE, FORCED_CLOSE_REASON,
};
pub use error::{DisconnectError, RelayError};
pub use list_participants::ListParticipantsUseCase;
pub use monitor_liveness::{MonitorLivenessUseCase, TickReport};
pub use relay_message::RelayMessageUseCase;

use crate::{
    domain::{BroadcastReport, Connection, ConnectionId, MessagePusher},
    infrastructure::dto::websocket::Envelope,
};

/// Serialize and fan out an envelope, logging instead of failing
async fn broadcast_envelope(
    message_pusher: &dyn MessagePusher,
    envelope: Envelope,
    exclude: Option<ConnectionId>,
) -> BroadcastReport {
    match envelope.to_json() {
        Ok(json) => message_pusher.broadcast(&json, exclude).await,
        Err(e) => {
            tracing::error!("Failed to serialize broadcast envelope: {}", e);
            BroadcastReport::default()
        }
    }
}

/// Serialize and send an envelope to one connection, logging failures
fn send_envelope(connection: &dyn Connection, envelope: Envelope) {
    let result = envelope
        .to_json()
        .map_err(|e| e.to_string())
        .and_then(|json| connection.send(&json).map_err(|e| e.to_string()));
    if let Err(e) = result {
        tracing::warn!("Failed to send envelope to {}: {}", connection.id(), e);
    }
}
