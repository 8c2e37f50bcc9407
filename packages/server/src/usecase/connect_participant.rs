//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 参加者の登録、user_joined のブロードキャスト、welcome の個別送信
//!
//! ### どのような状況を想定しているか
//! - 正常系：最初の参加者（通知対象なし）
//! - 正常系：既存の参加者がいる状態での接続

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::{
    domain::{
        Connection, MembershipChange, MessagePusher, Participant, ParticipantRegistry, Timestamp,
    },
    infrastructure::dto::websocket::SystemEnvelope,
};

use super::{broadcast_envelope, send_envelope};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Registry（参加者管理の抽象化）
    registry: Arc<dyn ParticipantRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
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

    /// 参加者接続を実行
    ///
    /// 1. Registry に参加者を登録
    /// 2. 新規参加者以外に user_joined をブロードキャスト
    /// 3. 新規参加者にだけ welcome を送信
    ///
    /// # Returns
    ///
    /// 登録された参加者（Domain Model）
    pub async fn execute(&self, connection: Arc<dyn Connection>) -> Participant {
        let MembershipChange {
            participant,
            active_users,
        } = self.registry.register(connection.clone()).await;
        let now = Timestamp::new(self.clock.now_millis());

        tracing::info!(
            "Participant '{}' ({}) joined. Active participants: {}",
            participant.id,
            participant.display_name,
            active_users
        );

        let report = broadcast_envelope(
            self.message_pusher.as_ref(),
            SystemEnvelope::joined(&participant, active_users, now).into(),
            Some(connection.id()),
        )
        .await;
        tracing::debug!(
            "Broadcasted user_joined for '{}' to {} participant(s)",
            participant.id,
            report.delivered
        );

        send_envelope(
            connection.as_ref(),
            SystemEnvelope::welcome(&participant, now).into(),
        );

        participant
    }
}
