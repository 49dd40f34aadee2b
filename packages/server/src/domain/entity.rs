//! Entity 定義

use serde::{Deserialize, Serialize};

use super::value_object::{Color, ConnectionId, MessageId, Timestamp};

/// 接続中の参加者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub created_at: Timestamp,
    pub color: Color,
}

impl Connection {
    /// 接続時刻から色を導出して新しい接続を作成
    pub fn admit(id: ConnectionId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            color: Color::derive(created_at),
        }
    }

    /// `cutoff` 以前（同時刻を含む）に作成された接続かどうか
    pub fn is_stale(&self, cutoff: Timestamp) -> bool {
        self.created_at <= cutoff
    }
}

/// メッセージログの 1 件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// エスケープ済みテキスト、または画像の URL
    pub data: String,
    pub created_at: Timestamp,
    pub color: Color,
}

impl Message {
    pub fn new(id: MessageId, data: String, created_at: Timestamp, color: Color) -> Self {
        Self {
            id,
            data,
            created_at,
            color,
        }
    }
}
