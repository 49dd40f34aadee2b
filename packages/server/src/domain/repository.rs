//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! どちらのコレクションも外部のテーブルストアに置かれ、件数の確認と
//! その後の書き込みはトランザクションになりません（check-then-act）。

use async_trait::async_trait;

use super::{
    Color, Connection, ConnectionId, Message, MessageId, RepositoryError, Timestamp,
};

/// 接続テーブルへのインターフェース
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// 接続数を取得
    async fn count(&self) -> Result<usize, RepositoryError>;

    /// 接続を保存（同じ ID があれば上書き）
    async fn insert(&self, connection: Connection) -> Result<(), RepositoryError>;

    /// 接続を削除（存在しなくてもエラーにしない）
    async fn remove(&self, id: &ConnectionId) -> Result<(), RepositoryError>;

    /// ID で接続を検索
    async fn find(&self, id: &ConnectionId) -> Result<Option<Connection>, RepositoryError>;

    /// 全ての接続を取得（スキャン順）
    async fn list(&self) -> Result<Vec<Connection>, RepositoryError>;
}

/// メッセージテーブルへのインターフェース
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージ件数を取得
    async fn count(&self) -> Result<usize, RepositoryError>;

    /// メッセージを保存（同じ ID があれば上書き）
    async fn insert(&self, message: Message) -> Result<(), RepositoryError>;

    /// 既存メッセージの内容・色・作成時刻を ID を保ったまま書き換える
    async fn overwrite(
        &self,
        id: MessageId,
        data: &str,
        color: &Color,
        created_at: Timestamp,
    ) -> Result<(), RepositoryError>;

    /// 全てのメッセージを取得（スキャン順）
    async fn list(&self) -> Result<Vec<Message>, RepositoryError>;
}
