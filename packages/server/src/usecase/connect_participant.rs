//! UseCase: 参加者接続処理
//!
//! ### どのような状況を想定しているか
//! - 正常系：上限未満での接続
//! - 異常系：接続数の上限超過、テーブルストアの障害
//! - WebSocket の窓口から来た接続は、受け付け前に送信チャンネルを登録し、
//!   拒否されたらチャンネルを外す

use std::sync::Arc;

use crate::domain::{Connection, ConnectionId, ConnectionRegistry, MessagePusher, PusherChannel};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - 登録された接続（接続時刻と色を含む）
    /// * `Err(ConnectError)` - 上限超過またはテーブルストアの障害
    pub async fn execute(&self, connection_id: ConnectionId) -> Result<Connection, ConnectError> {
        let connection = self.registry.admit(connection_id).await?;
        Ok(connection)
    }

    /// 接続に送信チャンネルを結びつける
    ///
    /// 登録簿に載る前に結びつけておけば、直後の配信で取りこぼされない。
    pub async fn attach_channel(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
    }

    /// 送信チャンネルを外す（接続が拒否されたとき）
    pub async fn detach_channel(&self, connection_id: &ConnectionId) {
        self.message_pusher.unregister_client(connection_id).await;
    }
}
