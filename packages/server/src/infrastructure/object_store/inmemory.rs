//! InMemory ObjectStore 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ObjectStore, ObjectStoreError};

/// 保存されたオブジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// インメモリのオブジェクトストア
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_public_object(
        &self,
        key: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), ObjectStoreError> {
        tracing::debug!("Storing object '{}' ({} bytes)", key, body.len());
        self.objects.lock().await.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                body,
            },
        );
        Ok(())
    }
}
