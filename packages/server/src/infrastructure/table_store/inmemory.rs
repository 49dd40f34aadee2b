//! InMemory TableStore 実装
//!
//! テーブルごとにキー属性名を登録し、行をキーの JSON 表現で引く
//! `BTreeMap` に保持します。スキャン順はキーの辞書順です。
//! 個々の操作はロックで直列化されますが、操作をまたいだロックは取りません。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{Item, TableStore, TableStoreError};

struct Table {
    key_attribute: String,
    rows: BTreeMap<String, Item>,
}

/// インメモリのテーブルストア
pub struct InMemoryTableStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl InMemoryTableStore {
    /// テーブルを持たない空のストアを作成
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// テーブルを登録した状態のストアを作成
    ///
    /// # Arguments
    ///
    /// * `tables` - (テーブル名, キー属性名) のリスト
    pub fn with_tables<'a>(tables: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let tables = tables
            .into_iter()
            .map(|(name, key_attribute)| {
                (
                    name.to_string(),
                    Table {
                        key_attribute: key_attribute.to_string(),
                        rows: BTreeMap::new(),
                    },
                )
            })
            .collect();
        Self {
            tables: Mutex::new(tables),
        }
    }

    /// テーブルを追加（既にあれば何もしない）
    pub async fn create_table(&self, name: &str, key_attribute: &str) {
        let mut tables = self.tables.lock().await;
        tables.entry(name.to_string()).or_insert_with(|| Table {
            key_attribute: key_attribute.to_string(),
            rows: BTreeMap::new(),
        });
    }
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

fn row_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        // zero-pad numbers so scan order follows numeric order
        Value::Number(n) => match n.as_i64() {
            Some(i) if i >= 0 => format!("{i:020}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn scan(&self, table: &str) -> Result<Vec<Item>, TableStoreError> {
        let tables = self.tables.lock().await;
        let table = lookup(&tables, table)?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn count(&self, table: &str) -> Result<usize, TableStoreError> {
        let tables = self.tables.lock().await;
        Ok(lookup(&tables, table)?.rows.len())
    }

    async fn get(&self, table: &str, key: &Value) -> Result<Option<Item>, TableStoreError> {
        let tables = self.tables.lock().await;
        Ok(lookup(&tables, table)?.rows.get(&row_key(key)).cloned())
    }

    async fn put(&self, table: &str, item: Item) -> Result<(), TableStoreError> {
        let mut tables = self.tables.lock().await;
        let entry = lookup_mut(&mut tables, table)?;
        let key = item
            .get(&entry.key_attribute)
            .map(row_key)
            .ok_or_else(|| TableStoreError::MissingKey {
                table: table.to_string(),
                key: entry.key_attribute.clone(),
            })?;
        entry.rows.insert(key, item);
        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        key: &Value,
        fields: Item,
    ) -> Result<(), TableStoreError> {
        let mut tables = self.tables.lock().await;
        let entry = lookup_mut(&mut tables, table)?;
        let key_attribute = entry.key_attribute.clone();
        let row = entry.rows.entry(row_key(key)).or_insert_with(|| {
            let mut item = Item::new();
            item.insert(key_attribute, key.clone());
            item
        });
        for (name, value) in fields {
            row.insert(name, value);
        }
        Ok(())
    }

    async fn delete(&self, table: &str, key: &Value) -> Result<(), TableStoreError> {
        let mut tables = self.tables.lock().await;
        lookup_mut(&mut tables, table)?.rows.remove(&row_key(key));
        Ok(())
    }
}

fn lookup<'a>(tables: &'a HashMap<String, Table>, name: &str) -> Result<&'a Table, TableStoreError> {
    tables
        .get(name)
        .ok_or_else(|| TableStoreError::TableNotFound(name.to_string()))
}

fn lookup_mut<'a>(
    tables: &'a mut HashMap<String, Table>,
    name: &str,
) -> Result<&'a mut Table, TableStoreError> {
    tables
        .get_mut(name)
        .ok_or_else(|| TableStoreError::TableNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Item {
        value.as_object().cloned().unwrap()
    }

    fn create_test_store() -> InMemoryTableStore {
        InMemoryTableStore::with_tables([("connections", "connectionId"), ("messages", "id")])
    }

    #[tokio::test]
    async fn test_put_and_get() {
        // テスト項目: 保存した行をキーで取得できる
        // given (前提条件):
        let store = create_test_store();
        let row = item(json!({"connectionId": "alice", "created": 1, "color": "00c07b"}));

        // when (操作):
        store.put("connections", row.clone()).await.unwrap();
        let result = store.get("connections", &json!("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(result, Some(row));
        assert_eq!(store.count("connections").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_put_without_key_attribute_fails() {
        // テスト項目: キー属性を含まない行は保存できない
        // given (前提条件):
        let store = create_test_store();

        // when (操作):
        let result = store.put("messages", item(json!({"data": "hi"}))).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(TableStoreError::MissingKey {
                table: "messages".to_string(),
                key: "id".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_table_is_an_error() {
        // テスト項目: 登録されていないテーブルへの操作はエラーになる
        // given (前提条件):
        let store = InMemoryTableStore::new();

        // when (操作):
        let result = store.scan("connections").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(TableStoreError::TableNotFound("connections".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_overwrites_only_given_fields() {
        // テスト項目: update は指定した属性だけを書き換え、他の属性は残す
        // given (前提条件):
        let store = create_test_store();
        store
            .put(
                "messages",
                item(json!({"id": 3, "data": "old", "created": 1, "color": "001111"})),
            )
            .await
            .unwrap();

        // when (操作):
        store
            .update("messages", &json!(3), item(json!({"data": "new", "created": 2})))
            .await
            .unwrap();

        // then (期待する結果):
        let row = store.get("messages", &json!(3)).await.unwrap().unwrap();
        assert_eq!(row, item(json!({"id": 3, "data": "new", "created": 2, "color": "001111"})));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        // テスト項目: 存在しないキーの削除もエラーにならない
        // given (前提条件):
        let store = create_test_store();
        store
            .put("connections", item(json!({"connectionId": "alice"})))
            .await
            .unwrap();

        // when (操作):
        let first = store.delete("connections", &json!("alice")).await;
        let second = store.delete("connections", &json!("alice")).await;

        // then (期待する結果):
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(store.count("connections").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scan_orders_numeric_keys_numerically() {
        // テスト項目: 数値キーのスキャン順が数値の昇順になる
        // given (前提条件):
        let store = create_test_store();
        for id in [10, 2, 1] {
            store.put("messages", item(json!({"id": id}))).await.unwrap();
        }

        // when (操作):
        let rows = store.scan("messages").await.unwrap();

        // then (期待する結果):
        let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }
}
