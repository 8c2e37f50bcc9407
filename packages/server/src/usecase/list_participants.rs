//! UseCase: 参加者一覧の取得（プレゼンス表示用）

use std::sync::Arc;

use crate::domain::{Participant, ParticipantRegistry};

/// 参加者一覧取得のユースケース
pub struct ListParticipantsUseCase {
    registry: Arc<dyn ParticipantRegistry>,
}

impl ListParticipantsUseCase {
    pub fn new(registry: Arc<dyn ParticipantRegistry>) -> Self {
        Self { registry }
    }

    /// 接続中の参加者を参加順で返す
    pub async fn execute(&self) -> Vec<Participant> {
        self.registry
            .enumerate()
            .await
            .into_iter()
            .map(|(_, participant)| participant)
            .collect()
    }
}
