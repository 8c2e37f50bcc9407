//! InMemory Participant Registry 実装
//!
//! ドメイン層が定義する ParticipantRegistry trait の具体的な実装。
//! `HashMap<ConnectionId, Member>` を 1 つの Mutex で保護し、各操作を
//! アトミックに実行します。スナップショット系の操作はロック中に複製を作り、
//! 呼び出し側はロックを保持しないまま走査できます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use agora_shared::time::Clock;

use crate::domain::{
    Connection, ConnectionId, DisplayName, Member, MembershipChange, Participant, ParticipantId,
    ParticipantIdFactory, ParticipantRegistry, Timestamp,
};

struct RegistryState {
    entries: HashMap<ConnectionId, Member>,
    /// Last display-name sequence number handed out; never reused
    name_sequence: u64,
}

impl RegistryState {
    fn remove(&mut self, connection_id: ConnectionId) -> Option<MembershipChange> {
        let (_, participant) = self.entries.remove(&connection_id)?;
        Some(MembershipChange {
            participant,
            active_users: self.entries.len(),
        })
    }
}

/// インメモリ Participant Registry 実装
pub struct InMemoryParticipantRegistry {
    state: Mutex<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryParticipantRegistry {
    /// 新しい InMemoryParticipantRegistry を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                entries: HashMap::new(),
                name_sequence: 0,
            }),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

#[async_trait]
impl ParticipantRegistry for InMemoryParticipantRegistry {
    async fn register(&self, connection: Arc<dyn Connection>) -> MembershipChange {
        let now = self.now();
        let mut state = self.state.lock().await;

        let mut id = ParticipantIdFactory::generate(now.value());
        while state.entries.values().any(|(_, p)| p.id == id) {
            id = ParticipantIdFactory::generate(now.value());
        }

        state.name_sequence += 1;
        let participant = Participant::new(
            id,
            DisplayName::numbered(state.name_sequence),
            connection.id(),
            now,
        );

        if let Some((_, replaced)) = state
            .entries
            .insert(connection.id(), (connection.clone(), participant.clone()))
        {
            tracing::warn!(
                "Connection {} was registered twice, replacing participant '{}'",
                connection.id(),
                replaced.id
            );
        }

        tracing::debug!(
            "Registered participant '{}' ({}) on {}",
            participant.id,
            participant.display_name,
            connection.id()
        );
        MembershipChange {
            participant,
            active_users: state.entries.len(),
        }
    }

    async fn lookup(&self, connection_id: ConnectionId) -> Option<Participant> {
        let state = self.state.lock().await;
        state.entries.get(&connection_id).map(|(_, p)| p.clone())
    }

    async fn find_by_identity(&self, participant_id: &ParticipantId) -> Option<Member> {
        let state = self.state.lock().await;
        state
            .entries
            .values()
            .find(|(_, p)| &p.id == participant_id)
            .map(|(connection, p)| (connection.clone(), p.clone()))
    }

    async fn touch(&self, connection_id: ConnectionId) {
        let now = self.now();
        let mut state = self.state.lock().await;
        if let Some((_, participant)) = state.entries.get_mut(&connection_id) {
            participant.touch(now);
        }
    }

    async fn remove(&self, connection_id: ConnectionId) -> Option<MembershipChange> {
        let mut state = self.state.lock().await;
        state.remove(connection_id)
    }

    async fn size(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    async fn enumerate(&self) -> Vec<Member> {
        let state = self.state.lock().await;
        let mut members: Vec<Member> = state
            .entries
            .values()
            .map(|(connection, p)| (connection.clone(), p.clone()))
            .collect();
        members.sort_by_key(|(_, p)| p.connection_id);
        members
    }

    async fn mark_probe_pending(&self, connection_id: ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        match state.entries.get_mut(&connection_id) {
            Some((_, participant)) => {
                participant.probe();
                true
            }
            None => false,
        }
    }

    async fn evict_if_pending(&self, connection_id: ConnectionId) -> Option<MembershipChange> {
        let mut state = self.state.lock().await;
        let pending = state
            .entries
            .get(&connection_id)
            .is_some_and(|(_, p)| p.is_pending());
        if !pending {
            return None;
        }
        state.remove(connection_id)
    }

    async fn acknowledge_probe(&self, connection_id: ConnectionId) {
        let mut state = self.state.lock().await;
        if let Some((_, participant)) = state.entries.get_mut(&connection_id) {
            participant.acknowledge();
        }
    }

    async fn mark_idle_before(&self, cutoff: Timestamp) -> usize {
        let mut state = self.state.lock().await;
        state
            .entries
            .values_mut()
            .map(|(_, participant)| participant.decay(cutoff))
            .filter(|changed| *changed)
            .count()
    }
}
