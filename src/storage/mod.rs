//! File storage for the marketplace backend.
//!
//! [`Storage`] pairs one [`drivers::StoreDriver`] backend with destination
//! resolution and a bounded worker pool for bulk calls. Single-file calls
//! bypass the pool entirely and run under a short per-call timeout; bulk
//! calls run concurrently with a fixed worker count, fail fast on the first
//! error, and observe a per-call deadline cooperatively.
pub mod dest;
pub mod drivers;
pub mod error;
mod pool;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::config;

pub use dest::Destination;
pub use error::{StorageError, StorageResult, StoreError, StoreResult};

use drivers::StoreDriver;
use pool::{BulkOptions, TransferJob};

const DEFAULT_WORKERS: usize = 5;
const DEFAULT_BULK_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(10);

/// One file handed over by the upload handler: the original filename and the
/// content read from the multipart field.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub filename: String,
    pub content: Bytes,
}

/// Caller-facing record of one stored file, serialized back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub url: String,
    pub key: String,
}

impl From<Destination> for UploadedFile {
    fn from(dest: Destination) -> Self {
        Self {
            filename: dest.filename,
            url: dest.url,
            key: dest.key,
        }
    }
}

/// Storage facade over a single backend.
pub struct Storage {
    driver: Arc<dyn StoreDriver>,
    public_base: Url,
    workers: usize,
    bulk_timeout: Duration,
    op_timeout: Duration,
}

impl Storage {
    /// Creates a new storage facade over `driver`, serving public URLs under
    /// `public_base`.
    #[must_use]
    pub fn new(driver: Arc<dyn StoreDriver>, public_base: Url) -> Self {
        Self {
            driver,
            public_base,
            workers: DEFAULT_WORKERS,
            bulk_timeout: DEFAULT_BULK_TIMEOUT,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// Sets the fixed worker count used by bulk calls.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the bulk-call deadline and the single-call timeout.
    #[must_use]
    pub fn with_timeouts(mut self, bulk: Duration, single: Duration) -> Self {
        self.bulk_timeout = bulk;
        self.op_timeout = single;
        self
    }

    /// Builds the configured backend and returns a facade over it.
    ///
    /// # Errors
    ///
    /// Fails when the configured public base URL is malformed.
    pub async fn from_config(config: &config::Storage) -> StorageResult<Self> {
        let (driver, public_base): (Arc<dyn StoreDriver>, Url) = match &config.backend {
            config::Backend::S3 {
                bucket,
                region,
                endpoint,
                public_endpoint,
            } => {
                let base = parse_base(public_endpoint, Some(bucket))?;
                let store = drivers::s3::new(bucket, region.as_deref(), endpoint.as_deref()).await;
                (Arc::new(store), base)
            }
            config::Backend::Local { path, public_url } => (
                Arc::new(drivers::local::new(path)),
                parse_base(public_url, None)?,
            ),
        };

        Ok(Self::new(driver, public_base)
            .with_workers(config.workers)
            .with_timeouts(
                Duration::from_secs(config.bulk_timeout_secs),
                Duration::from_secs(config.op_timeout_secs),
            ))
    }

    /// Uploads one file under `dir`, outside the worker pool.
    ///
    /// # Errors
    ///
    /// Returns the backend failure wrapped with the destination key, or
    /// [`StorageError::Cancelled`] when the single-call timeout expires.
    pub async fn upload_file(
        &self,
        dir: &str,
        filename: &str,
        content: Bytes,
    ) -> StorageResult<UploadedFile> {
        let dest = dest::resolve(&self.public_base, dir, filename);
        match tokio::time::timeout(self.op_timeout, self.driver.upload(&dest.key, &content)).await
        {
            Ok(Ok(_)) => Ok(dest.into()),
            Ok(Err(source)) => Err(StorageError::Transfer {
                key: dest.key,
                source,
            }),
            Err(_) => Err(StorageError::Cancelled),
        }
    }

    /// Uploads many files under `dir` concurrently. The first failure aborts
    /// the call and discards any partial successes; results arrive in
    /// completion order, not input order.
    ///
    /// # Errors
    ///
    /// Returns an input error for an empty batch, otherwise the first error
    /// any worker reported.
    pub async fn upload_files(
        &self,
        dir: &str,
        files: Vec<FileSource>,
    ) -> StorageResult<Vec<UploadedFile>> {
        if files.is_empty() {
            return Err(StorageError::InvalidInput("no files to upload".to_string()));
        }
        let jobs = files
            .into_iter()
            .map(|file| TransferJob::Upload {
                dest: dest::resolve(&self.public_base, dir, &file.filename),
                content: file.content,
            })
            .collect();
        pool::run_bulk(Arc::clone(&self.driver), jobs, self.bulk_options()).await
    }

    /// Deletes one object, outside the worker pool.
    ///
    /// # Errors
    ///
    /// A missing object is an error; see
    /// [`drivers::StoreDriver::delete`].
    pub async fn delete_file(&self, key: &str) -> StorageResult<()> {
        match tokio::time::timeout(self.op_timeout, self.driver.delete(key)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(StorageError::Transfer {
                key: key.to_string(),
                source,
            }),
            Err(_) => Err(StorageError::Cancelled),
        }
    }

    /// Deletes many objects concurrently under the same fail-fast policy as
    /// [`Storage::upload_files`].
    ///
    /// # Errors
    ///
    /// Returns an input error for an empty batch, otherwise the first error
    /// any worker reported.
    pub async fn delete_files(&self, keys: Vec<String>) -> StorageResult<()> {
        if keys.is_empty() {
            return Err(StorageError::InvalidInput("no keys to delete".to_string()));
        }
        let jobs = keys
            .into_iter()
            .map(|key| TransferJob::Delete { key })
            .collect();
        pool::run_bulk(Arc::clone(&self.driver), jobs, self.bulk_options()).await?;
        Ok(())
    }

    fn bulk_options(&self) -> BulkOptions {
        BulkOptions {
            workers: self.workers,
            timeout: self.bulk_timeout,
        }
    }
}

fn parse_base(endpoint: &str, bucket: Option<&str>) -> StorageResult<Url> {
    let mut base = Url::parse(endpoint).map_err(|err| StorageError::Config(err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(StorageError::Config(format!(
            "`{endpoint}` cannot serve as a public base URL"
        )));
    }
    if let Some(bucket) = bucket {
        if let Ok(mut segments) = base.path_segments_mut() {
            segments.pop_if_empty().push(bucket);
        }
    }
    Ok(base)
}
