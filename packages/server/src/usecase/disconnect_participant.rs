//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute()（トランスポート側の切断）
//! - DisconnectParticipantUseCase::force_disconnect()（管理 API からの強制切断）
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と user_left の通知
//! - エッジケース：既に削除済みの接続の切断（通知は 1 回だけ）
//! - 異常系：userId 未指定、存在しない userId での強制切断

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::{
    domain::{
        Connection, ConnectionId, MembershipChange, MessagePusher, Participant, ParticipantId,
        ParticipantRegistry, Timestamp,
    },
    infrastructure::dto::websocket::SystemEnvelope,
};

use super::{broadcast_envelope, error::DisconnectError};

/// Close code sent when an operator forces a participant out
pub const FORCED_CLOSE_CODE: u16 = 4000;
/// Close reason sent when an operator forces a participant out
pub const FORCED_CLOSE_REASON: &str = "Disconnected by server";

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn ParticipantRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// 参加者切断を実行
    ///
    /// Removes the participant and announces `user_left` with the remaining
    /// count. Returns `None` (and announces nothing) if the connection was
    /// already removed, e.g. by eviction or a forced disconnect.
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<Participant> {
        let MembershipChange {
            participant,
            active_users,
        } = self.registry.remove(connection_id).await?;

        tracing::info!(
            "Participant '{}' ({}) left. Active participants: {}",
            participant.id,
            participant.display_name,
            active_users
        );

        let now = Timestamp::new(self.clock.now_millis());
        broadcast_envelope(
            self.message_pusher.as_ref(),
            SystemEnvelope::left(&participant, active_users, now).into(),
            None,
        )
        .await;

        Some(participant)
    }

    /// Forcibly disconnect the participant identified by `user_id`
    ///
    /// # Errors
    ///
    /// * `DisconnectError::MissingIdentity` - `user_id` is absent or blank
    /// * `DisconnectError::NotFound` - no registered participant has that identity
    pub async fn force_disconnect(
        &self,
        user_id: Option<&str>,
    ) -> Result<Participant, DisconnectError> {
        let raw = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(DisconnectError::MissingIdentity)?;
        let not_found = || DisconnectError::NotFound(raw.to_string());

        let participant_id = ParticipantId::new(raw.to_string()).map_err(|_| not_found())?;
        let (connection, _) = self
            .registry
            .find_by_identity(&participant_id)
            .await
            .ok_or_else(not_found)?;

        let participant = self.execute(connection.id()).await.ok_or_else(not_found)?;

        if let Err(e) = connection.close(FORCED_CLOSE_CODE, FORCED_CLOSE_REASON) {
            tracing::warn!(
                "Failed to close connection of '{}' after forced disconnect: {}",
                participant.id,
                e
            );
        }
        tracing::info!("Participant '{}' was forcibly disconnected", participant.id);

        Ok(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::connection::OutboundFrame,
        usecase::test_support::{TestRelay, create_channel_connection, drain_frames, drain_json},
    };
    use agora_shared::time::FixedClock;

    fn create_test_usecase() -> (DisconnectParticipantUseCase, TestRelay) {
        let clock = Arc::new(FixedClock::new(1672531200000));
        let relay = TestRelay::new(clock.clone());
        let usecase = DisconnectParticipantUseCase::new(
            relay.registry.clone(),
            relay.message_pusher.clone(),
            clock,
        );
        (usecase, relay)
    }

    #[tokio::test]
    async fn test_disconnect_announces_left_with_remaining_count() {
        // テスト項目: 切断時に残りの参加者へ user_left と残り人数が通知される
        // given (前提条件):
        let (usecase, relay) = create_test_usecase();
        let (a, _a_rx) = create_channel_connection();
        let (b, mut b_rx) = create_channel_connection();
        let (c, mut c_rx) = create_channel_connection();
        let alice = relay.registry.register(a.clone()).await.participant;
        relay.registry.register(b.clone()).await;
        relay.registry.register(c.clone()).await;

        // when (操作):
        let removed = usecase.execute(a.id()).await;

        // then (期待する結果):
        assert_eq!(removed, Some(alice.clone()));
        assert_eq!(relay.registry.size().await, 2);
        for rx in [&mut b_rx, &mut c_rx] {
            let received = drain_json(rx);
            assert_eq!(received.len(), 1);
            assert_eq!(received[0]["event"], "user_left");
            assert_eq!(received[0]["userId"], alice.id.as_str());
            assert_eq!(received[0]["activeUsers"], 2);
        }
    }

    #[tokio::test]
    async fn test_disconnect_twice_announces_once() {
        // テスト項目: 同じ接続の切断が重なっても user_left は 1 回だけ通知される
        // given (前提条件):
        let (usecase, relay) = create_test_usecase();
        let (a, _a_rx) = create_channel_connection();
        let (b, mut b_rx) = create_channel_connection();
        relay.registry.register(a.clone()).await;
        relay.registry.register(b.clone()).await;

        // when (操作):
        let first = usecase.execute(a.id()).await;
        let second = usecase.execute(a.id()).await;

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(drain_json(&mut b_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_force_disconnect_closes_connection() {
        // テスト項目: 強制切断で参加者が削除され、接続がクローズコード付きで閉じられる
        // given (前提条件):
        let (usecase, relay) = create_test_usecase();
        let (a, mut a_rx) = create_channel_connection();
        let (b, mut b_rx) = create_channel_connection();
        let alice = relay.registry.register(a.clone()).await.participant;
        relay.registry.register(b.clone()).await;

        // when (操作):
        let result = usecase.force_disconnect(Some(alice.id.as_str())).await;

        // then (期待する結果):
        assert_eq!(result, Ok(alice.clone()));
        assert_eq!(relay.registry.size().await, 1);
        assert!(!a.is_open());
        assert_eq!(
            drain_frames(&mut a_rx),
            vec![OutboundFrame::Close {
                code: FORCED_CLOSE_CODE,
                reason: FORCED_CLOSE_REASON.to_string(),
            }]
        );
        let received = drain_json(&mut b_rx);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["event"], "user_left");
        assert_eq!(received[0]["activeUsers"], 1);
    }

    #[tokio::test]
    async fn test_force_disconnect_unknown_identity() {
        // テスト項目: 存在しない userId の強制切断は NotFound となり、Registry は変化しない
        // given (前提条件):
        let (usecase, relay) = create_test_usecase();
        let (a, _a_rx) = create_channel_connection();
        relay.registry.register(a.clone()).await;

        // when (操作):
        let result = usecase.force_disconnect(Some("user_0_nobody")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(DisconnectError::NotFound("user_0_nobody".to_string()))
        );
        assert_eq!(relay.registry.size().await, 1);
    }

    #[tokio::test]
    async fn test_force_disconnect_missing_identity() {
        // テスト項目: userId 未指定・空白のみの場合は MissingIdentity となる
        // given (前提条件):
        let (usecase, _relay) = create_test_usecase();

        // when (操作):
        let missing = usecase.force_disconnect(None).await;
        let blank = usecase.force_disconnect(Some("   ")).await;

        // then (期待する結果):
        assert_eq!(missing, Err(DisconnectError::MissingIdentity));
        assert_eq!(blank, Err(DisconnectError::MissingIdentity));
    }
}
