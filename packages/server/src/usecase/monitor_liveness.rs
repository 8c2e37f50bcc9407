//! UseCase: 接続の死活監視
//!
//! Each tick sweeps a registry snapshot:
//!
//! - a connection whose previous probe is still unanswered is evicted: the
//!   participant is removed, the socket is terminated and `user_timeout` is
//!   announced with the remaining count;
//! - every other connection is marked pending and probed. The acknowledgment
//!   ([`MonitorLivenessUseCase::acknowledge`]) arrives between ticks.
//!
//! Independently, participants without activity for the idle window lose
//! their advisory `is_active` flag. Idleness never triggers eviction.
//!
//! ## テスト実装の作業記録
//!
//! ### どのような状況を想定しているか
//! - 正常系：応答する接続は残り続ける
//! - 異常系：2 回連続で応答しない接続は evict され、通知は 1 回だけ
//! - エッジケース：アイドル判定は evict とは独立

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use agora_shared::time::Clock;

use crate::{
    domain::{
        Connection, ConnectionId, MembershipChange, MessagePusher, Participant,
        ParticipantRegistry, Timestamp,
    },
    infrastructure::dto::websocket::SystemEnvelope,
};

use super::broadcast_envelope;

/// Outcome of one monitor tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Connections that were sent a probe
    pub probed: usize,
    /// Participants evicted for not answering the previous probe
    pub evicted: Vec<Participant>,
    /// Participants whose activity flag was cleared
    pub idled: usize,
}

/// 死活監視のユースケース
pub struct MonitorLivenessUseCase {
    registry: Arc<dyn ParticipantRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    idle_window: Duration,
}

impl MonitorLivenessUseCase {
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        idle_window: Duration,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
            idle_window,
        }
    }

    /// Record a probe acknowledgment (pong) from a connection
    pub async fn acknowledge(&self, connection_id: ConnectionId) {
        self.registry.acknowledge_probe(connection_id).await;
    }

    /// Run one sweep over the registry
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();

        for (connection, participant) in self.registry.enumerate().await {
            if participant.is_pending() {
                if let Some(evicted) = self.evict(connection.as_ref()).await {
                    report.evicted.push(evicted);
                    continue;
                }
                // Acknowledged after the snapshot: ping it like everyone else
            }

            if !self.registry.mark_probe_pending(connection.id()).await {
                // Left between the snapshot and now
                continue;
            }
            match connection.ping() {
                Ok(()) => report.probed += 1,
                Err(e) => tracing::warn!("Failed to probe '{}': {}", participant.id, e),
            }
        }

        let now = self.clock.now_millis();
        let window = i64::try_from(self.idle_window.as_millis()).unwrap_or(i64::MAX);
        report.idled = self
            .registry
            .mark_idle_before(Timestamp::new(now.saturating_sub(window)))
            .await;

        report
    }

    async fn evict(&self, connection: &dyn Connection) -> Option<Participant> {
        // A pong that landed after the snapshot keeps the participant.
        let MembershipChange {
            participant,
            active_users,
        } = self.registry.evict_if_pending(connection.id()).await?;
        connection.terminate();

        tracing::info!(
            "Connection to '{}' ({}) lost: no answer to liveness probe. Active participants: {}",
            participant.id,
            participant.display_name,
            active_users
        );

        let now = Timestamp::new(self.clock.now_millis());
        broadcast_envelope(
            self.message_pusher.as_ref(),
            SystemEnvelope::timeout(&participant, active_users, now).into(),
            None,
        )
        .await;

        Some(participant)
    }

    /// Spawn the repeating sweep, first firing one `interval` after start.
    ///
    /// The task stops when `shutdown` flips to `true` or its sender is dropped.
    pub fn spawn(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("Liveness monitor started (interval: {:?})", interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = self.tick().await;
                        tracing::debug!(
                            "Liveness tick: probed {}, evicted {}, idled {}",
                            report.probed,
                            report.evicted.len(),
                            report.idled
                        );
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Liveness monitor stopped");
        })
    }
}
