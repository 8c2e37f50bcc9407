//! Participant registry trait definition.
//!
//! The registry is the single source of truth for membership and naming.
//! Every component reads and mutates participants through these operations
//! only; implementations must make each operation atomic with respect to the
//! others.

use std::sync::Arc;

use async_trait::async_trait;

use super::{ConnectionId, Participant, ParticipantId, Timestamp, transport::Connection};

/// A registry entry as returned by snapshot operations
pub type Member = (Arc<dyn Connection>, Participant);

/// A participant that joined or left, with the registry size right after
/// the change (read under the same lock as the change itself)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipChange {
    pub participant: Participant,
    pub active_users: usize,
}

/// Participant Registry trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait ParticipantRegistry: Send + Sync {
    /// Register a new connection and return its freshly created participant
    async fn register(&self, connection: Arc<dyn Connection>) -> MembershipChange;

    /// Look up the participant owning a connection
    async fn lookup(&self, connection_id: ConnectionId) -> Option<Participant>;

    /// Find a participant (and its connection) by identity
    async fn find_by_identity(&self, participant_id: &ParticipantId) -> Option<Member>;

    /// Refresh the last-activity timestamp; no-op if the handle is gone
    async fn touch(&self, connection_id: ConnectionId);

    /// Remove a participant, returning it if it was registered
    async fn remove(&self, connection_id: ConnectionId) -> Option<MembershipChange>;

    /// Number of registered participants
    async fn size(&self) -> usize;

    /// Snapshot of all entries, ordered by connection handle
    async fn enumerate(&self) -> Vec<Member>;

    /// Mark a probe as outstanding; returns `false` if the handle is gone
    async fn mark_probe_pending(&self, connection_id: ConnectionId) -> bool;

    /// Remove the participant only if its probe is still outstanding.
    ///
    /// The check and the removal happen atomically, so an acknowledgment that
    /// races with the liveness sweep either saves the participant or arrives
    /// too late, never both.
    async fn evict_if_pending(&self, connection_id: ConnectionId) -> Option<MembershipChange>;

    /// Record a probe acknowledgment; no-op if the handle is gone
    async fn acknowledge_probe(&self, connection_id: ConnectionId);

    /// Clear the activity flag of everyone idle since before `cutoff`.
    ///
    /// Returns how many flags changed.
    async fn mark_idle_before(&self, cutoff: Timestamp) -> usize;
}
