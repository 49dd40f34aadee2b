//! WebSocket front door.
//!
//! The server assigns each socket a UUID v4 connection id and turns socket
//! events into triggers: the upgrade attaches a push channel and runs
//! `connect` (a rejected connect is answered instead of upgrading), every text
//! frame runs `send`, and closing runs `disconnect`.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    domain::ConnectionId,
    ui::{state::AppState, trigger::TriggerResponse},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let client_id = match ConnectionId::new(Uuid::new_v4().to_string()) {
        Ok(id) => id,
        Err(e) => return TriggerResponse::error(e.to_string()).into_response(),
    };

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    let response = state
        .triggers
        .open(&client_id, &addr.ip().to_string(), tx.clone())
        .await;
    if !response.is_ok() {
        tracing::warn!("Rejected WebSocket from {}: {}", addr, response.body);
        return response.into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state, client_id, tx, rx))
}

/// Spawns a task that forwards pushed payloads to the WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    client_id: ConnectionId,
    reply: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();

    let state_clone = state.clone();
    let client_id_clone = client_id.clone();

    // Spawn a task to receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received text from '{}'", client_id_clone);
                    let response = state_clone
                        .triggers
                        .send(client_id_clone.as_str(), text.as_str())
                        .await;
                    // the error body goes back to the sender only
                    if !response.is_ok() && reply.send(response.body).is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", client_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let response = state.triggers.disconnect(client_id.as_str()).await;
    if !response.is_ok() {
        tracing::warn!("Failed to disconnect '{}': {}", client_id, response.body);
    }
}
