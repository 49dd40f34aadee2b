//! Trigger surface.
//!
//! Every external event (a client connects, disconnects or sends, or the
//! periodic cleanup fires) enters the server through [`Triggers`]. Each trigger
//! is independent and answers with a [`TriggerResponse`]: `200` with an empty
//! body, or `500` with `{"message": "..."}`.

use std::sync::Arc;

use axum::{
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    domain::{ConnectionId, PusherChannel},
    infrastructure::dto::websocket::ErrorResponse,
    usecase::{
        CleanupConnectionsUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        SendMessageUseCase,
    },
};

/// Result of one trigger invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerResponse {
    pub status: u16,
    pub body: String,
}

impl TriggerResponse {
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: String::new(),
        }
    }

    /// `500` with `{"message": message}`
    pub fn error(message: impl Into<String>) -> Self {
        let error = ErrorResponse {
            message: message.into(),
        };
        let body = serde_json::to_string(&error)
            .unwrap_or_else(|_| r#"{"message":"internal error"}"#.to_string());
        Self { status: 500, body }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

impl IntoResponse for TriggerResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.body.is_empty() {
            status.into_response()
        } else {
            (status, [(CONTENT_TYPE, "application/json")], self.body).into_response()
        }
    }
}

/// Entry points for the connect / disconnect / send / cleanup triggers
pub struct Triggers {
    connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    send_message_usecase: Arc<SendMessageUseCase>,
    cleanup_connections_usecase: Arc<CleanupConnectionsUseCase>,
}

impl Triggers {
    pub fn new(
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        cleanup_connections_usecase: Arc<CleanupConnectionsUseCase>,
    ) -> Self {
        Self {
            connect_participant_usecase,
            disconnect_participant_usecase,
            send_message_usecase,
            cleanup_connections_usecase,
        }
    }

    /// A client opened a connection
    pub async fn connect(&self, connection_id: &str, source_ip: &str) -> TriggerResponse {
        tracing::info!("Connect from {} as '{}'", source_ip, connection_id);
        let connection_id = match ConnectionId::new(connection_id.to_string()) {
            Ok(id) => id,
            Err(e) => return reject("connect", e),
        };

        match self.connect_participant_usecase.execute(connection_id).await {
            Ok(connection) => {
                tracing::info!(
                    "Connection '{}' admitted with color '{}'",
                    connection.id,
                    connection.color.as_str()
                );
                TriggerResponse::ok()
            }
            Err(e) => reject("connect", e),
        }
    }

    /// A client opened a socket owned by this server
    ///
    /// The push channel is attached before the connection is admitted, so a
    /// broadcast racing the admission cannot find it in the registry without
    /// a channel. A rejected connection gets its channel detached again.
    pub async fn open(
        &self,
        connection_id: &ConnectionId,
        source_ip: &str,
        channel: PusherChannel,
    ) -> TriggerResponse {
        self.connect_participant_usecase
            .attach_channel(connection_id.clone(), channel)
            .await;

        let response = self.connect(connection_id.as_str(), source_ip).await;
        if !response.is_ok() {
            self.connect_participant_usecase
                .detach_channel(connection_id)
                .await;
        }
        response
    }

    /// A client closed its connection
    pub async fn disconnect(&self, connection_id: &str) -> TriggerResponse {
        let connection_id = match ConnectionId::new(connection_id.to_string()) {
            Ok(id) => id,
            Err(e) => return reject("disconnect", e),
        };

        match self
            .disconnect_participant_usecase
            .execute(connection_id.clone())
            .await
        {
            Ok(()) => {
                tracing::info!("Connection '{}' removed", connection_id);
                TriggerResponse::ok()
            }
            Err(e) => reject("disconnect", e),
        }
    }

    /// A client sent a message
    pub async fn send(&self, connection_id: &str, body: &str) -> TriggerResponse {
        let connection_id = match ConnectionId::new(connection_id.to_string()) {
            Ok(id) => id,
            Err(e) => return reject("send", e),
        };

        match self
            .send_message_usecase
            .execute(&connection_id, body)
            .await
        {
            Ok(outcome) => {
                tracing::info!(
                    "Message {} from '{}' delivered to {} of {} connection(s)",
                    outcome.message.id.value(),
                    connection_id,
                    outcome.reports.iter().filter(|r| !r.is_lost()).count(),
                    outcome.reports.len()
                );
                TriggerResponse::ok()
            }
            Err(e) => reject("send", e),
        }
    }

    /// Periodic sweep of stale connections; errors are logged only
    pub async fn cleanup(&self) {
        if let Err(e) = self.cleanup_connections_usecase.execute().await {
            tracing::error!("cleanup failed: {}", e);
        }
    }
}

fn reject(trigger: &str, error: impl std::fmt::Display) -> TriggerResponse {
    tracing::error!("{} failed: {}", trigger, error);
    TriggerResponse::error(error.to_string())
}
