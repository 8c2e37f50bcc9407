//! Domain entities.

use serde::Serialize;

use super::value_object::{ConnectionId, DisplayName, ParticipantId, Timestamp};

/// Transport-level liveness of a participant's connection.
///
/// `Evicted` is not represented: an evicted participant no longer exists in
/// the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    /// Answered the last probe, or connected since the last tick
    Alive,
    /// A probe was sent and no acknowledgment has arrived yet
    Pending,
}

/// A registered, identified connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: DisplayName,
    pub connection_id: ConnectionId,
    pub connected_at: Timestamp,
    pub last_active: Timestamp,
    /// Advisory presence flag, cleared after the idle window
    pub is_active: bool,
    pub liveness: Liveness,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        display_name: DisplayName,
        connection_id: ConnectionId,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            id,
            display_name,
            connection_id,
            connected_at,
            last_active: connected_at,
            is_active: true,
            liveness: Liveness::Alive,
        }
    }

    /// Record inbound activity
    pub fn touch(&mut self, now: Timestamp) {
        self.last_active = now;
        self.is_active = true;
    }

    /// Record that a liveness probe was issued
    pub fn probe(&mut self) {
        self.liveness = Liveness::Pending;
    }

    /// Record a probe acknowledgment
    pub fn acknowledge(&mut self) {
        self.liveness = Liveness::Alive;
    }

    pub fn is_pending(&self) -> bool {
        self.liveness == Liveness::Pending
    }

    /// Clear the activity flag if the last activity is older than `cutoff`.
    ///
    /// Returns `true` when the flag changed.
    pub fn decay(&mut self, cutoff: Timestamp) -> bool {
        if self.is_active && self.last_active < cutoff {
            self.is_active = false;
            return true;
        }
        false
    }
}
