//! Registry を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - ブロードキャスト開始時点の Registry スナップショットを取得
//! - 除外対象以外の open な接続へペイロードを送信
//!
//! 送信失敗は受信者ごとに隔離されます。失敗した受信者の削除は行わず、
//! トランスポート側の close イベントに任せます。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{BroadcastReport, ConnectionId, MessagePusher, ParticipantRegistry};

/// Broadcast engine backed by the participant registry
pub struct RegistryMessagePusher {
    registry: Arc<dyn ParticipantRegistry>,
}

impl RegistryMessagePusher {
    pub fn new(registry: Arc<dyn ParticipantRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl MessagePusher for RegistryMessagePusher {
    async fn broadcast(&self, content: &str, exclude: Option<ConnectionId>) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (connection, participant) in self.registry.enumerate().await {
            if Some(connection.id()) == exclude {
                continue;
            }
            if !connection.is_open() {
                tracing::debug!(
                    "Skipping '{}' during broadcast: connection not open",
                    participant.id
                );
                report.skipped += 1;
                continue;
            }
            // ブロードキャストでは一部の送信失敗を許容
            match connection.send(content) {
                Ok(()) => {
                    report.delivered += 1;
                    tracing::debug!("Broadcasted message to '{}'", participant.id);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Failed to push message to '{}': {}", participant.id, e);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Connection, MockConnection, TransportError},
        infrastructure::{
            connection::{OutboundFrame, WebSocketConnection},
            repository::InMemoryParticipantRegistry,
        },
    };
    use agora_shared::time::FixedClock;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 送信者を除外したファンアウト
    // - 一部の受信者の失敗が他の受信者に影響しないこと
    // - open でない接続がスキップされること
    // ========================================

    fn create_test_registry() -> Arc<InMemoryParticipantRegistry> {
        Arc::new(InMemoryParticipantRegistry::new(Arc::new(FixedClock::new(
            1_000,
        ))))
    }

    fn create_channel_connection() -> (
        Arc<WebSocketConnection>,
        mpsc::UnboundedReceiver<OutboundFrame>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(WebSocketConnection::new(ConnectionId::next(), tx)),
            rx,
        )
    }

    fn create_failing_connection() -> Arc<MockConnection> {
        let id = ConnectionId::next();
        let mut connection = MockConnection::new();
        connection.expect_id().return_const(id);
        connection.expect_is_open().return_const(true);
        connection.expect_send().returning(move |_| {
            Err(TransportError::SendFailed {
                connection: id.to_string(),
                reason: "broken pipe".to_string(),
            })
        });
        Arc::new(connection)
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        // テスト項目: N 人中、送信者を除いた N-1 人に配信される
        // given (前提条件):
        let registry = create_test_registry();
        let pusher = RegistryMessagePusher::new(registry.clone());
        let (alice, mut alice_rx) = create_channel_connection();
        let (bob, mut bob_rx) = create_channel_connection();
        let (charlie, mut charlie_rx) = create_channel_connection();
        registry.register(alice.clone()).await;
        registry.register(bob.clone()).await;
        registry.register(charlie.clone()).await;

        // when (操作):
        let report = pusher.broadcast("hello", Some(alice.id())).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(
            bob_rx.recv().await,
            Some(OutboundFrame::Text("hello".to_string()))
        );
        assert_eq!(
            charlie_rx.recv().await,
            Some(OutboundFrame::Text("hello".to_string()))
        );
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_without_exclusion_reaches_everyone() {
        // テスト項目: 除外指定なしの場合は全員に配信される
        // given (前提条件):
        let registry = create_test_registry();
        let pusher = RegistryMessagePusher::new(registry.clone());
        let (alice, mut alice_rx) = create_channel_connection();
        let (bob, mut bob_rx) = create_channel_connection();
        registry.register(alice).await;
        registry.register(bob).await;

        // when (操作):
        let report = pusher.broadcast("left", None).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert!(alice_rx.recv().await.is_some());
        assert!(bob_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure_does_not_abort() {
        // テスト項目: 一部の受信者への送信が失敗しても残りの受信者には配信され、Registry からは削除されない
        // given (前提条件):
        let registry = create_test_registry();
        let pusher = RegistryMessagePusher::new(registry.clone());
        let (sender, _sender_rx) = create_channel_connection();
        let broken = create_failing_connection();
        let (healthy, mut healthy_rx) = create_channel_connection();
        registry.register(sender.clone()).await;
        registry.register(broken.clone()).await;
        registry.register(healthy.clone()).await;

        // when (操作):
        let report = pusher.broadcast("payload", Some(sender.id())).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(
            healthy_rx.recv().await,
            Some(OutboundFrame::Text("payload".to_string()))
        );
        assert_eq!(registry.size().await, 3);
    }

    #[tokio::test]
    async fn test_broadcast_skips_closed_connections() {
        // テスト項目: open でない接続はスキップされる
        // given (前提条件):
        let registry = create_test_registry();
        let pusher = RegistryMessagePusher::new(registry.clone());
        let (closed, _closed_rx) = create_channel_connection();
        let (open, mut open_rx) = create_channel_connection();
        registry.register(closed.clone()).await;
        registry.register(open.clone()).await;
        closed.mark_closed();

        // when (操作):
        let report = pusher.broadcast("payload", None).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);
        assert!(open_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_empty_registry() {
        // テスト項目: 参加者がいなくてもエラーにならない
        // given (前提条件):
        let pusher = RegistryMessagePusher::new(create_test_registry());

        // when (操作):
        let report = pusher.broadcast("payload", None).await;

        // then (期待する結果):
        assert_eq!(report, BroadcastReport::default());
    }
}
