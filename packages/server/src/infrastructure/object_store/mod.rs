//! ObjectStore 実装
//!
//! - `s3`: `aws-sdk-s3` による実装（public-read で保存）
//! - `inmemory`: テストとローカル実行用の実装

pub mod inmemory;
pub mod s3;

pub use inmemory::{InMemoryObjectStore, StoredObject};
pub use s3::{S3ObjectStore, S3Settings};
