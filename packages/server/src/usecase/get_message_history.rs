//! UseCase: メッセージ履歴の取得
//!
//! 保存されているメッセージを古い順に返します。本文がバケットの公開 URL で
//! 始まるものは画像、それ以外はテキストとして扱います。

use std::sync::Arc;

use crate::domain::{Color, Message, MessageLog, Timestamp, object_store::public_bucket_prefix};

use super::error::HistoryError;

/// 履歴の本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryContent {
    /// HTML エスケープ済みのテキスト
    Text(String),
    /// 画像の公開 URL
    Image(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub content: HistoryContent,
    pub color: Color,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHistory {
    /// メッセージログの上限
    pub max: usize,
    pub entries: Vec<HistoryEntry>,
}

/// メッセージ履歴取得のユースケース
pub struct GetMessageHistoryUseCase {
    message_log: Arc<MessageLog>,
    image_prefix: String,
}

impl GetMessageHistoryUseCase {
    /// 新しい GetMessageHistoryUseCase を作成
    ///
    /// # Arguments
    ///
    /// * `message_log` - メッセージログ
    /// * `bucket` - 画像を保存しているバケット名
    pub fn new(message_log: Arc<MessageLog>, bucket: &str) -> Self {
        Self {
            message_log,
            image_prefix: public_bucket_prefix(bucket),
        }
    }

    pub async fn execute(&self) -> Result<MessageHistory, HistoryError> {
        let messages = self.message_log.list_ordered_by_time().await?;
        Ok(MessageHistory {
            max: self.message_log.limit(),
            entries: messages
                .into_iter()
                .map(|message| self.to_entry(message))
                .collect(),
        })
    }

    fn to_entry(&self, message: Message) -> HistoryEntry {
        let content = if message.data.starts_with(&self.image_prefix) {
            HistoryContent::Image(message.data)
        } else {
            HistoryContent::Text(message.data)
        };
        HistoryEntry {
            content,
            color: message.color,
            created_at: message.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        repository::TableMessageRepository, table_store::InMemoryTableStore,
    };
    use chrono::Duration;
    use irori_shared::time::FixedClock;

    #[tokio::test]
    async fn test_history_classifies_images_by_bucket_prefix() {
        // テスト項目: バケットの URL で始まる本文は画像、それ以外はテキストになる
        // given (前提条件):
        let store = Arc::new(InMemoryTableStore::with_tables([("messages", "id")]));
        let clock = Arc::new(FixedClock::from_compact(20240101120000123));
        let log = Arc::new(MessageLog::new(
            Arc::new(TableMessageRepository::new(store, "messages")),
            clock.clone(),
            50,
        ));
        let color = Color::from_stored("00c07b".to_string());
        log.save_message("hello", &color).await.unwrap();
        clock.advance(Duration::milliseconds(1));
        let url = "https://chat-images.s3-ap-northeast-1.amazonaws.com/cat20240101120000124.png";
        log.save_message(url, &color).await.unwrap();
        clock.advance(Duration::milliseconds(1));
        log.save_message("https://example.com", &color)
            .await
            .unwrap();
        let usecase = GetMessageHistoryUseCase::new(log, "chat-images");

        // when (操作):
        let history = usecase.execute().await.unwrap();

        // then (期待する結果):
        assert_eq!(history.max, 50);
        let contents: Vec<HistoryContent> =
            history.entries.into_iter().map(|e| e.content).collect();
        assert_eq!(
            contents,
            vec![
                HistoryContent::Text("hello".to_string()),
                HistoryContent::Image(url.to_string()),
                HistoryContent::Text("https://example.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_history_store_unavailable() {
        // テスト項目: テーブルがない場合は Upstream エラーになる
        // given (前提条件):
        let log = Arc::new(MessageLog::new(
            Arc::new(TableMessageRepository::new(
                Arc::new(InMemoryTableStore::new()),
                "messages",
            )),
            Arc::new(FixedClock::from_compact(20240101120000123)),
            50,
        ));
        let usecase = GetMessageHistoryUseCase::new(log, "chat-images");

        // when (操作):
        let result = usecase.execute().await;

        // then (期待する結果):
        assert!(matches!(result, Err(HistoryError::Upstream(_))));
    }
}
