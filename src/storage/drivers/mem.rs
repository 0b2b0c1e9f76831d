//! In-memory driver, for tests and local development.
use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::{StoreDriver, UploadResponse};
use crate::storage::error::{StoreError, StoreResult};

#[derive(Default)]
pub struct MemStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

/// Create new in-memory storage.
#[must_use]
pub fn new() -> MemStore {
    MemStore::default()
}

impl MemStore {
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl StoreDriver for MemStore {
    async fn upload(&self, key: &str, content: &Bytes) -> StoreResult<UploadResponse> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), content.clone());
        Ok(UploadResponse::default())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match self.objects.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_get_returns_the_content() {
        let store = new();
        let content = Bytes::from_static(b"file content");

        store.upload("users/1.txt", &content).await.unwrap();

        assert_eq!(store.get("users/1.txt").await, Some(content));
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_an_error() {
        let store = new();

        let err = store.delete("users/1.txt").await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
