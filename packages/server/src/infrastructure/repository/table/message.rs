//! メッセージテーブルの Repository 実装

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    domain::{Color, Message, MessageId, MessageRepository, RepositoryError, Timestamp},
    infrastructure::{
        dto::{
            conversion::{from_item, to_item},
            table::MessageRecord,
        },
        table_store::{Item, TableStore},
    },
};

use super::malformed;

/// TableStore 上のメッセージテーブル
pub struct TableMessageRepository {
    store: Arc<dyn TableStore>,
    table: String,
}

impl TableMessageRepository {
    /// 新しい TableMessageRepository を作成
    ///
    /// # Arguments
    ///
    /// * `store` - テーブルストア
    /// * `table` - メッセージテーブル名（キー属性は `id`）
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }
}

#[async_trait]
impl MessageRepository for TableMessageRepository {
    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.store.count(&self.table).await?)
    }

    async fn insert(&self, message: Message) -> Result<(), RepositoryError> {
        let item =
            to_item(&MessageRecord::from(message)).map_err(|e| malformed(&self.table, e))?;
        self.store.put(&self.table, item).await?;
        Ok(())
    }

    async fn overwrite(
        &self,
        id: MessageId,
        data: &str,
        color: &Color,
        created_at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut fields = Item::new();
        fields.insert("data".to_string(), Value::from(data));
        fields.insert("created".to_string(), Value::from(created_at.value()));
        fields.insert("color".to_string(), Value::from(color.as_str()));

        self.store
            .update(&self.table, &Value::from(id.value()), fields)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>, RepositoryError> {
        let items = self.store.scan(&self.table).await?;
        let messages = items
            .into_iter()
            .filter_map(|item| match from_item::<MessageRecord>(item) {
                Ok(record) => Some(Message::from(record)),
                Err(e) => {
                    tracing::warn!("Skipping message row in '{}': {}", self.table, e);
                    None
                }
            })
            .collect();
        Ok(messages)
    }
}
