//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    infrastructure::dto::http::{ControlResponseDto, ParticipantSummaryDto},
    ui::state::AppState,
    usecase::DisconnectError,
};

/// Query parameters for the forced-disconnect endpoint
#[derive(Debug, Deserialize)]
pub struct DisconnectQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of connected participants
pub async fn list_participants(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ParticipantSummaryDto>> {
    let participants = state.list_participants_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(
        participants
            .into_iter()
            .map(ParticipantSummaryDto::from)
            .collect(),
    )
}

/// Forcibly disconnect a participant by identity
pub async fn disconnect_participant(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DisconnectQuery>, QueryRejection>,
) -> (StatusCode, Json<ControlResponseDto>) {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            tracing::warn!("Rejected disconnect request: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ControlResponseDto::failure(rejection.body_text())),
            );
        }
    };

    match state
        .disconnect_participant_usecase
        .force_disconnect(query.user_id.as_deref())
        .await
    {
        Ok(participant) => (
            StatusCode::OK,
            Json(ControlResponseDto::ok(
                format!("User {} disconnected", participant.display_name),
                participant.id.into_string(),
            )),
        ),
        Err(e @ DisconnectError::MissingIdentity) => {
            tracing::warn!("Rejected disconnect request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ControlResponseDto::failure(e.to_string())),
            )
        }
        Err(e @ DisconnectError::NotFound(_)) => {
            tracing::warn!("Rejected disconnect request: {}", e);
            (
                StatusCode::NOT_FOUND,
                Json(ControlResponseDto::failure(e.to_string())),
            )
        }
    }
}
