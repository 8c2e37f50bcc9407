//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//! - 送信者の activity 更新、正規化、送信者以外へのブロードキャスト
//!
//! ### どのような状況を想定しているか
//! - 正常系：プレーンテキストの中継（送信者にはエコーしない）
//! - 異常系：Registry から消えた接続からのメッセージ

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::{
    domain::{
        BroadcastReport, Connection, ConnectionId, MessagePusher, ParticipantRegistry, Timestamp,
    },
    infrastructure::dto::{
        normalizer::normalize_inbound,
        websocket::{Envelope, ErrorEnvelope},
    },
};

use super::{error::RelayError, send_envelope};

/// Text of the private error envelope sent when a message cannot be relayed
pub const RELAY_FAILURE_MESSAGE: &str = "Failed to process message";

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    registry: Arc<dyn ParticipantRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl RelayMessageUseCase {
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

    /// Relay one inbound payload from `connection_id` to everyone else
    ///
    /// # Errors
    ///
    /// Returns an error if the sender is no longer registered or the
    /// normalized envelope cannot be serialized.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        raw: &str,
    ) -> Result<BroadcastReport, RelayError> {
        self.registry.touch(connection_id).await;

        let sender = self
            .registry
            .lookup(connection_id)
            .await
            .ok_or(RelayError::UnknownConnection(connection_id))?;

        let now = Timestamp::new(self.clock.now_millis());
        let envelope: Envelope = normalize_inbound(raw, &sender, now).into();
        let json = envelope.to_json()?;

        let report = self
            .message_pusher
            .broadcast(&json, Some(connection_id))
            .await;
        tracing::debug!(
            "Relayed message from '{}' to {} participant(s) ({} failed)",
            sender.id,
            report.delivered,
            report.failed
        );
        Ok(report)
    }

    /// Tell the sender privately that its message was dropped
    pub fn report_failure(&self, connection: &dyn Connection, error: &RelayError) {
        tracing::error!(
            "Failed to process message from {}: {}",
            connection.id(),
            error
        );
        send_envelope(connection, ErrorEnvelope::new(RELAY_FAILURE_MESSAGE).into());
    }
}
