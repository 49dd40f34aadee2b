//! Payloads exchanged with connected clients.

use serde::{Deserialize, Serialize};

/// Body of a send trigger.
///
/// `image` is a data URI (`data:image/png;base64,...`); when present, `text`
/// carries the original file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Payload pushed to every fan-out target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishPayload {
    pub data: String,
    pub color: String,
}

/// Error body returned by a failed trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
