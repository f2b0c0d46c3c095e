//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::ConversationId,
    infrastructure::dto::http::{ConversationSummaryDto, MemberDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Conversations that currently have members
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConversationSummaryDto>>, StatusCode> {
    let rooms = state
        .inspect_conversations_usecase
        .list()
        .await
        .map_err(|e| {
            tracing::error!("Failed to read room registry: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

/// Members of a single conversation
pub async fn conversation_members(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<MemberDto>>, StatusCode> {
    let conversation_id =
        ConversationId::try_from(conversation_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    let members = state
        .inspect_conversations_usecase
        .members(conversation_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read room registry: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok(Json(members.into_iter().map(Into::into).collect()))
}
