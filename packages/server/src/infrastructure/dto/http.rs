//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::Participant;

/// Presence entry returned by `GET /api/participants`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummaryDto {
    pub user_id: String,
    pub username: String,
    pub connected_at: String,
    pub last_active: String,
    pub is_active: bool,
}

impl From<Participant> for ParticipantSummaryDto {
    fn from(participant: Participant) -> Self {
        Self {
            user_id: participant.id.into_string(),
            username: participant.display_name.into_string(),
            connected_at: participant.connected_at.to_rfc3339(),
            last_active: participant.last_active.to_rfc3339(),
            is_active: participant.is_active,
        }
    }
}

/// Body of every control-plane response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponseDto {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ControlResponseDto {
    pub fn ok(message: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            user_id: Some(user_id.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, DisplayName, ParticipantId, Timestamp};
    use serde_json::json;

    #[test]
    fn test_participant_to_summary_dto() {
        // テスト項目: ドメインの Participant が一覧表示用 DTO に変換される
        // given (前提条件):
        let mut participant = Participant::new(
            ParticipantId::new("user_1_abc".to_string()).unwrap(),
            DisplayName::numbered(1),
            ConnectionId::new(1),
            Timestamp::new(1672531200000),
        );
        participant.decay(Timestamp::new(1672531200001));

        // when (操作):
        let dto: ParticipantSummaryDto = participant.into();

        // then (期待する結果):
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            json!({
                "userId": "user_1_abc",
                "username": "User 1",
                "connectedAt": "2023-01-01T00:00:00.000Z",
                "lastActive": "2023-01-01T00:00:00.000Z",
                "isActive": false
            })
        );
    }

    #[test]
    fn test_failure_response_omits_user_id() {
        // テスト項目: 失敗レスポンスには userId が含まれない
        // given (前提条件):
        let dto = ControlResponseDto::failure("missing userId");

        // when (操作):
        let value = serde_json::to_value(&dto).unwrap();

        // then (期待する結果):
        assert_eq!(value, json!({"success": false, "message": "missing userId"}));
    }
}
