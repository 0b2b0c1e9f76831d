use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use artstore::storage::drivers::{local, StoreDriver, UploadResponse};
use artstore::{FileSource, Storage, StorageError, StoreResult};

fn base() -> Url {
    Url::parse("http://localhost:8080/uploads").unwrap()
}

fn file(name: &str, size: usize) -> FileSource {
    FileSource {
        filename: name.to_string(),
        content: Bytes::from(vec![0xA5; size]),
    }
}

#[tokio::test]
async fn uploads_a_batch_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(Arc::new(local::new(dir.path())), base());

    let uploaded = storage
        .upload_files("images", vec![file("a.png", 10 * 1024), file("b.png", 20 * 1024)])
        .await
        .unwrap();

    assert_eq!(uploaded.len(), 2);
    for entry in &uploaded {
        assert!(entry
            .url
            .starts_with("http://localhost:8080/uploads/images/"));
        assert!(entry.key.starts_with("images/"));
        assert!(entry.filename.ends_with(".png"));
    }

    let mut sizes: Vec<u64> = uploaded
        .iter()
        .map(|entry| {
            std::fs::metadata(dir.path().join(&entry.key))
                .unwrap()
                .len()
        })
        .collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![10 * 1024, 20 * 1024]);
}

#[tokio::test]
async fn round_trips_a_single_upload() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(Arc::new(local::new(dir.path())), base());
    let content = Bytes::from_static(b"oil on canvas");

    let uploaded = storage
        .upload_file("arts", "piece.jpg", content.clone())
        .await
        .unwrap();

    assert!(uploaded.filename.ends_with(".jpg"));
    let written = std::fs::read(dir.path().join(&uploaded.key)).unwrap();
    assert_eq!(written, content.to_vec());

    storage.delete_file(&uploaded.key).await.unwrap();
    let err = storage.delete_file(&uploaded.key).await.unwrap_err();
    assert!(err.to_string().contains(&uploaded.key));
}

#[tokio::test]
async fn bulk_delete_reports_the_missing_key() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(Arc::new(local::new(dir.path())), base());

    let uploaded = storage
        .upload_file("images", "x.png", Bytes::from_static(b"x"))
        .await
        .unwrap();

    let err = storage
        .delete_files(vec![
            uploaded.key,
            "images/does-not-exist.png".to_string(),
        ])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("images/does-not-exist.png"));
}

/// Backend whose every call takes longer than the bulk deadline used below.
struct StallingStore {
    delay: Duration,
}

#[async_trait]
impl StoreDriver for StallingStore {
    async fn upload(&self, _key: &str, _content: &Bytes) -> StoreResult<UploadResponse> {
        tokio::time::sleep(self.delay).await;
        Ok(UploadResponse::default())
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[tokio::test]
async fn slow_backend_hits_the_bulk_deadline() {
    let storage = Storage::new(
        Arc::new(StallingStore {
            delay: Duration::from_millis(150),
        }),
        base(),
    )
    .with_workers(2)
    .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

    let started = std::time::Instant::now();
    let err = storage
        .upload_files(
            "images",
            (0..6).map(|i| file(&format!("{i}.png"), 16)).collect(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(2));
}
