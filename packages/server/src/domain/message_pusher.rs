//! MessagePusher trait 定義
//!
//! 名前付きの接続 1 つにペイロードを届ける push-delivery チャンネルの抽象化。
//! 実装は Infrastructure 層（WebSocket / HTTP）が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// WebSocket 接続へ送るためのチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録（送信先を自前で持たない実装では何もしない）
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel);

    /// クライアントの送信チャンネルを登録解除
    async fn unregister_client(&self, client_id: &ConnectionId);

    /// 特定のクライアントにペイロードを 1 回だけ送信（リトライしない）
    async fn push_to(&self, client_id: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;
}
