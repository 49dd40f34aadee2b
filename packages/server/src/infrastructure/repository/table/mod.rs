//! TableStore を使った Repository 実装
//!
//! スキャン中に読み出せない行はログに残してスキップします。

mod connection;
mod message;

pub use connection::TableConnectionRepository;
pub use message::TableMessageRepository;

use crate::{domain::RepositoryError, infrastructure::table_store::TableStoreError};

impl From<TableStoreError> for RepositoryError {
    fn from(e: TableStoreError) -> Self {
        RepositoryError::Store(e.to_string())
    }
}

fn malformed(table: &str, reason: impl ToString) -> RepositoryError {
    RepositoryError::MalformedRecord {
        table: table.to_string(),
        reason: reason.to_string(),
    }
}
