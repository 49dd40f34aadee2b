//! HTTP を使った MessagePusher 実装
//!
//! ソケットを外部のゲートウェイが保持している構成で使います。
//! 配信は `POST <endpoint>/@connections/<id>` に JSON 本文を送るだけで、
//! 2xx 以外の応答は配信失敗として扱います。
//! ソケットはこのプロセスにないため、register / unregister は何もしません。

use async_trait::async_trait;
use reqwest::{StatusCode, header::CONTENT_TYPE};

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

pub struct HttpMessagePusher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMessagePusher {
    /// 新しい HttpMessagePusher を作成
    ///
    /// # Arguments
    ///
    /// * `endpoint` - ゲートウェイの管理 API のベース URL（末尾の `/` は無視）
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    fn connection_url(&self, client_id: &ConnectionId) -> String {
        format!("{}/@connections/{}", self.endpoint, client_id.as_str())
    }
}

#[async_trait]
impl MessagePusher for HttpMessagePusher {
    async fn register_client(&self, client_id: ConnectionId, _sender: PusherChannel) {
        tracing::debug!(
            "Client '{}' is managed by the gateway, ignoring local channel",
            client_id
        );
    }

    async fn unregister_client(&self, _client_id: &ConnectionId) {}

    async fn push_to(
        &self,
        client_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let response = self
            .client
            .post(self.connection_url(client_id))
            .header(CONTENT_TYPE, "application/json")
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::GONE {
            return Err(MessagePushError::ClientNotFound(
                client_id.as_str().to_string(),
            ));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MessagePushError::PushFailed(format!("{status} {text}")));
        }

        tracing::debug!("Pushed message to client '{}' via gateway", client_id);
        Ok(())
    }
}
