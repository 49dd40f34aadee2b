//! HTTP API response DTOs.

use serde::Serialize;

/// One entry of the message history, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryDto {
    pub text: String,
    pub image_url: String,
    pub color: String,
    /// RFC 3339 (JST)
    pub created_at: Option<String>,
}

/// Response of `GET /api/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryDto {
    pub max: usize,
    pub messages: Vec<HistoryEntryDto>,
}
