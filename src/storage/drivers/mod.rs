use async_trait::async_trait;
use bytes::Bytes;

pub mod local;
pub mod mem;
pub mod s3;

use super::error::StoreResult;

/// Backend metadata returned for one completed upload.
#[derive(Debug, Default)]
pub struct UploadResponse {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

/// Contract implemented by every storage backend: write one object, delete
/// one object. Implementations must be safe to share across the workers of
/// one bulk call.
#[async_trait]
pub trait StoreDriver: Sync + Send {
    /// Uploads the content represented by `Bytes` to `key` in the store.
    ///
    /// # Errors
    ///
    /// Returns a `StoreResult` with the result of the upload operation.
    async fn upload(&self, key: &str, content: &Bytes) -> StoreResult<UploadResponse>;

    /// Deletes the object at `key`.
    ///
    /// # Errors
    ///
    /// A missing object is surfaced as
    /// [`StoreError::NotFound`](crate::storage::StoreError::NotFound), never
    /// as silent success.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}
