//! 汎用キーバリュー・テーブルストア
//!
//! ## 概要
//!
//! 接続・メッセージの両テーブルは、scan / count / get / put / update / delete
//! だけを持つ外部のテーブルストアに置かれます。Repository 実装はこの trait
//! にのみ依存します。
//!
//! ## 実装
//!
//! - `inmemory`: プロセス内の `BTreeMap` を使った実装

pub mod inmemory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use inmemory::InMemoryTableStore;

/// テーブルの 1 行（属性名 → 値）
pub type Item = Map<String, Value>;

/// テーブルストアのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableStoreError {
    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("item for table '{table}' is missing key attribute '{key}'")]
    MissingKey { table: String, key: String },

    #[error("table store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TableStore: Send + Sync {
    /// 全件を取得
    async fn scan(&self, table: &str) -> Result<Vec<Item>, TableStoreError>;

    /// 件数を取得
    async fn count(&self, table: &str) -> Result<usize, TableStoreError>;

    /// キーで 1 件取得
    async fn get(&self, table: &str, key: &Value) -> Result<Option<Item>, TableStoreError>;

    /// 1 件保存（キー属性は `item` に含める。既存の行は置き換える）
    async fn put(&self, table: &str, item: Item) -> Result<(), TableStoreError>;

    /// 指定した属性だけを書き換える（行がなければ作成する）
    async fn update(&self, table: &str, key: &Value, fields: Item)
    -> Result<(), TableStoreError>;

    /// キーで削除（存在しなくてもエラーにしない）
    async fn delete(&self, table: &str, key: &Value) -> Result<(), TableStoreError>;
}
