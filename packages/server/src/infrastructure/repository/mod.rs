//! Repository 実装
//!
//! - `table`: 汎用テーブルストア上の実装

pub mod table;

pub use table::{TableConnectionRepository, TableMessageRepository};
