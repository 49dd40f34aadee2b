//! WebSocket を使った MessagePusher 実装
//!
//! WebSocket の受け付けは UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は UI 層が作った `UnboundedSender` を接続 ID ごとに保持し、
//! 配信時にそこへ書き込むだけです。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let clients = Arc::new(Mutex::new(HashMap::new()));
/// let pusher = WebSocketMessagePusher::new(clients.clone());
///
/// pusher.push_to(&connection_id, r#"{"data":"hi","color":"00c07b"}"#).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// Key: connection id
    clients: Arc<Mutex<HashMap<String, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(clients: Arc<Mutex<HashMap<String, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", client_id);
        clients.insert(client_id.into_string(), sender);
    }

    async fn unregister_client(&self, client_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(client_id.as_str());
        tracing::debug!("Client '{}' unregistered from MessagePusher", client_id);
    }

    async fn push_to(
        &self,
        client_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(client_id.as_str()) {
            // 受信側のタスクが終了していると送信に失敗する
            sender
                .send(content.to_string())
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to client '{}'", client_id);
            Ok(())
        } else {
            Err(MessagePushError::ClientNotFound(
                client_id.as_str().to_string(),
            ))
        }
    }
}
