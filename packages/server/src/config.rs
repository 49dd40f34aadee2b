//! Server configuration.
//!
//! The binary reads flags and environment variables with `clap` and converts
//! them into a validated [`ChatConfig`].

use std::time::Duration;

use thiserror::Error;

/// Where uploaded images are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectStoreKind {
    /// In-process store; images are lost on restart
    #[default]
    Memory,
    S3,
}

impl std::str::FromStr for ObjectStoreKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "memory" => Ok(Self::Memory),
            "s3" => Ok(Self::S3),
            other => Err(ConfigError::UnknownObjectStore(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be at least 1")]
    ZeroLimit { name: &'static str },

    #[error("unknown object store '{0}' (expected 'memory' or 's3')")]
    UnknownObjectStore(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("connection and message tables must differ (both '{0}')")]
    SharedTable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub connection_limit: usize,
    pub message_limit: usize,
    pub connection_table: String,
    pub message_table: String,
    pub bucket: String,
    pub region: String,
    pub object_store: ObjectStoreKind,
    /// S3 互換ストレージのエンドポイント
    pub s3_endpoint: Option<String>,
    /// ゲートウェイの管理 API。指定があれば HTTP で配信する
    pub push_endpoint: Option<String>,
    /// 掃除の間隔。`None` なら定期実行しない
    pub cleanup_interval: Option<Duration>,
    pub stale_after: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            connection_limit: 100,
            message_limit: 50,
            connection_table: "connections".to_string(),
            message_table: "messages".to_string(),
            bucket: "irori-images".to_string(),
            region: "ap-northeast-1".to_string(),
            object_store: ObjectStoreKind::Memory,
            s3_endpoint: None,
            push_endpoint: None,
            cleanup_interval: Some(Duration::from_secs(3600)),
            stale_after: Duration::from_secs(7200),
        }
    }
}

impl ChatConfig {
    /// Check the values that the domain relies on
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.connection_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "LIMIT_CONNECTION_COUNT",
            });
        }
        if self.message_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "LIMIT_MESSAGE_COUNT",
            });
        }
        if self.connection_table.is_empty() {
            return Err(ConfigError::Empty("CONNECTION_TABLE_NAME"));
        }
        if self.message_table.is_empty() {
            return Err(ConfigError::Empty("MESSAGE_TABLE_NAME"));
        }
        if self.connection_table == self.message_table {
            return Err(ConfigError::SharedTable(self.connection_table));
        }
        if self.bucket.is_empty() {
            return Err(ConfigError::Empty("BUCKET_NAME"));
        }
        Ok(self)
    }

    /// Stale threshold for the sweep
    pub fn stale_after_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.stale_after).unwrap_or(chrono::Duration::MAX)
    }
}
