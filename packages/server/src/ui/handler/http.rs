//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    infrastructure::dto::{
        http::{HistoryDto, HistoryEntryDto},
        websocket::ErrorResponse,
    },
    ui::{state::AppState, trigger::TriggerResponse},
    usecase::{HistoryContent, HistoryEntry},
};
use irori_shared::time::compact_timestamp_to_jst_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Message history, oldest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoryDto>, (StatusCode, Json<ErrorResponse>)> {
    match state.get_message_history_usecase.execute().await {
        Ok(history) => Ok(Json(HistoryDto {
            max: history.max,
            messages: history.entries.into_iter().map(to_entry_dto).collect(),
        })),
        Err(e) => {
            tracing::error!("Failed to read message history: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    message: e.to_string(),
                }),
            ))
        }
    }
}

// Domain Model から DTO への変換
fn to_entry_dto(entry: HistoryEntry) -> HistoryEntryDto {
    let (text, image_url) = match entry.content {
        HistoryContent::Text(text) => (text, String::new()),
        HistoryContent::Image(url) => (String::new(), url),
    };
    HistoryEntryDto {
        text,
        image_url,
        color: entry.color.into_string(),
        created_at: compact_timestamp_to_jst_rfc3339(entry.created_at.value()),
    }
}

/// The gateway forwards the client address in `X-Forwarded-For`
fn source_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// `POST /triggers/connect/{id}`
pub async fn trigger_connect(
    State(state): State<Arc<AppState>>,
    Path(connection_id): Path<String>,
    headers: HeaderMap,
) -> TriggerResponse {
    state
        .triggers
        .connect(&connection_id, &source_ip(&headers))
        .await
}

/// `POST /triggers/disconnect/{id}`
pub async fn trigger_disconnect(
    State(state): State<Arc<AppState>>,
    Path(connection_id): Path<String>,
) -> TriggerResponse {
    state.triggers.disconnect(&connection_id).await
}

/// `POST /triggers/send/{id}` with the raw message body
pub async fn trigger_send(
    State(state): State<Arc<AppState>>,
    Path(connection_id): Path<String>,
    body: String,
) -> TriggerResponse {
    state.triggers.send(&connection_id, &body).await
}

/// `POST /triggers/cleanup`
pub async fn trigger_cleanup(State(state): State<Arc<AppState>>) -> StatusCode {
    state.triggers.cleanup().await;
    StatusCode::OK
}
