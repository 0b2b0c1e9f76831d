//! Local filesystem driver. Objects live under a base directory and the
//! destination key maps directly onto the relative path below it.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use super::{StoreDriver, UploadResponse};
use crate::storage::error::{StoreError, StoreResult};

pub struct LocalStore {
    base: PathBuf,
}

/// Create new filesystem storage rooted at `base`.
#[must_use]
pub fn new(base: impl AsRef<Path>) -> LocalStore {
    LocalStore {
        base: base.as_ref().to_path_buf(),
    }
}

impl LocalStore {
    fn absolute(&self, key: &str) -> PathBuf {
        self.base.join(key)
    }
}

#[async_trait]
impl StoreDriver for LocalStore {
    /// Writes the full content to `base/key`. When the write fails because
    /// the parent directory does not exist yet, all intermediate directories
    /// are created and the write is retried exactly once.
    async fn upload(&self, key: &str, content: &Bytes) -> StoreResult<UploadResponse> {
        let path = self.absolute(key);
        match fs::write(&path, content).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "creating missing parent directories");
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(&path, content).await?;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(UploadResponse::default())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.absolute(key)).await {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            other => Ok(other?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = new(dir.path());
        let content = Bytes::from_static(b"brush strokes");

        store.upload("arts/2024/cover.png", &content).await.unwrap();

        let written = std::fs::read(dir.path().join("arts/2024/cover.png")).unwrap();
        assert_eq!(written, content.to_vec());
    }

    #[tokio::test]
    async fn upload_round_trips_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = new(dir.path());
        let content = Bytes::from(vec![7u8; 4096]);

        store.upload("blob.bin", &content).await.unwrap();

        let written = std::fs::read(dir.path().join("blob.bin")).unwrap();
        assert_eq!(written, content.to_vec());
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = new(dir.path());

        store
            .upload("images/x.png", &Bytes::from_static(b"x"))
            .await
            .unwrap();
        store.delete("images/x.png").await.unwrap();

        assert!(!dir.path().join("images/x.png").exists());
    }

    #[tokio::test]
    async fn delete_of_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = new(dir.path());

        let err = store.delete("ghost.png").await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound(key) if key == "ghost.png"));
    }
}
