//! Domain error types.

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    ConnectionIdEmpty,
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The backing store rejected or failed the operation
    #[error("table store operation failed: {0}")]
    Store(String),

    /// A stored record could not be mapped to a domain entity
    #[error("malformed record in '{table}': {reason}")]
    MalformedRecord { table: String, reason: String },

    /// The log has no message to overwrite
    #[error("no message to rotate")]
    NothingToRotate,
}

/// ConnectionRegistry のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("too many connections (limit: {limit})")]
    CapacityExceeded { limit: usize },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Object store のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStoreError {
    #[error("failed to upload object '{key}': {reason}")]
    UploadFailed { key: String, reason: String },
}

/// Push-delivery のエラー（接続単位、呼び出し元には返さない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),
}
