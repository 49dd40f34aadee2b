//! 接続テーブルの Repository 実装

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    domain::{Connection, ConnectionId, ConnectionRepository, RepositoryError},
    infrastructure::{
        dto::{
            conversion::{from_item, to_item},
            table::ConnectionRecord,
        },
        table_store::{Item, TableStore},
    },
};

use super::malformed;

/// TableStore 上の接続テーブル
pub struct TableConnectionRepository {
    store: Arc<dyn TableStore>,
    table: String,
}

impl TableConnectionRepository {
    /// 新しい TableConnectionRepository を作成
    ///
    /// # Arguments
    ///
    /// * `store` - テーブルストア
    /// * `table` - 接続テーブル名（キー属性は `connectionId`）
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    fn decode(&self, item: Item) -> Result<Connection, RepositoryError> {
        let record: ConnectionRecord = from_item(item).map_err(|e| malformed(&self.table, e))?;
        Connection::try_from(record).map_err(|e| malformed(&self.table, e))
    }
}

#[async_trait]
impl ConnectionRepository for TableConnectionRepository {
    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.store.count(&self.table).await?)
    }

    async fn insert(&self, connection: Connection) -> Result<(), RepositoryError> {
        let item = to_item(&ConnectionRecord::from(connection))
            .map_err(|e| malformed(&self.table, e))?;
        self.store.put(&self.table, item).await?;
        Ok(())
    }

    async fn remove(&self, id: &ConnectionId) -> Result<(), RepositoryError> {
        self.store
            .delete(&self.table, &Value::from(id.as_str()))
            .await?;
        Ok(())
    }

    async fn find(&self, id: &ConnectionId) -> Result<Option<Connection>, RepositoryError> {
        self.store
            .get(&self.table, &Value::from(id.as_str()))
            .await?
            .map(|item| self.decode(item))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Connection>, RepositoryError> {
        let items = self.store.scan(&self.table).await?;
        let connections = items
            .into_iter()
            .filter_map(|item| match self.decode(item) {
                Ok(connection) => Some(connection),
                Err(e) => {
                    tracing::warn!("Skipping connection row: {}", e);
                    None
                }
            })
            .collect();
        Ok(connections)
    }
}
