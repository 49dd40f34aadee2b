//! MessageLog
//!
//! 上限付きのメッセージログです。上限に達した後は新しい ID を払い出さず、
//! 作成時刻が最も古いメッセージを ID を保ったまま上書きします。
//!
//! ID は追加時点の件数から決まるため、同時に追加されると ID が衝突することがあります。

use std::sync::Arc;

use irori_shared::time::Clock;

use crate::domain::{Color, Message, MessageId, MessageRepository, RepositoryError, Timestamp};

pub struct MessageLog {
    repository: Arc<dyn MessageRepository>,
    clock: Arc<dyn Clock>,
    limit: usize,
}

impl MessageLog {
    /// 新しい MessageLog を作成
    ///
    /// # Arguments
    ///
    /// * `repository` - メッセージテーブル
    /// * `clock` - 作成時刻の取得元
    /// * `limit` - 保持するメッセージ数の上限
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
        limit: usize,
    ) -> Self {
        Self {
            repository,
            clock,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub async fn count(&self) -> Result<usize, RepositoryError> {
        self.repository.count().await
    }

    /// 新しい ID でメッセージを追加する
    ///
    /// 既に上限に達している場合は何もせず `None` を返す。
    pub async fn append(
        &self,
        data: &str,
        color: &Color,
    ) -> Result<Option<Message>, RepositoryError> {
        let count = self.repository.count().await?;
        if count >= self.limit {
            return Ok(None);
        }

        let message = Message::new(
            MessageId::new(count as i64),
            data.to_string(),
            Timestamp::new(self.clock.now_compact()),
            color.clone(),
        );
        self.repository.insert(message.clone()).await?;
        Ok(Some(message))
    }

    /// 最も古いメッセージを上書きする
    ///
    /// 作成時刻が同じ場合は ID の小さい方を選ぶ。
    pub async fn rotate_oldest(
        &self,
        data: &str,
        color: &Color,
    ) -> Result<Message, RepositoryError> {
        let oldest = self
            .repository
            .list()
            .await?
            .into_iter()
            .min_by_key(|message| (message.created_at, message.id))
            .ok_or(RepositoryError::NothingToRotate)?;

        let created_at = Timestamp::new(self.clock.now_compact());
        self.repository
            .overwrite(oldest.id, data, color, created_at)
            .await?;
        tracing::debug!(
            "Rotated message {} (was created at {})",
            oldest.id.value(),
            oldest.created_at.value()
        );

        Ok(Message::new(oldest.id, data.to_string(), created_at, color.clone()))
    }

    /// メッセージを保存する
    ///
    /// 上限未満なら追加し、上限に達していれば最も古いメッセージを上書きする。
    pub async fn save_message(&self, data: &str, color: &Color) -> Result<Message, RepositoryError> {
        // append は件数を読み直すので、その間に埋まった場合は上書きに回る
        match self.append(data, color).await? {
            Some(message) => Ok(message),
            None => self.rotate_oldest(data, color).await,
        }
    }

    /// 作成時刻の昇順（同時刻は ID 順）で全メッセージを返す
    pub async fn list_ordered_by_time(&self) -> Result<Vec<Message>, RepositoryError> {
        let mut messages = self.repository.list().await?;
        messages.sort_by_key(|message| (message.created_at, message.id));
        Ok(messages)
    }
}
