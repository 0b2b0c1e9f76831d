#![allow(clippy::module_name_repetitions)]
//! File storage and bulk transfer layer for the artstore marketplace
//! backend.
//!
//! The HTTP handlers hand this crate a batch of multipart files and a
//! logical directory; the crate resolves destinations, pushes the bytes to
//! the configured backend, and returns the public URLs to serve. Bulk
//! uploads and deletes run on a fixed-size worker pool, fail fast on the
//! first error, and observe a per-call deadline cooperatively between jobs.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use artstore::storage::drivers::local;
//! use artstore::{FileSource, Storage};
//! use bytes::Bytes;
//! use url::Url;
//!
//! # async fn example() -> artstore::StorageResult<()> {
//! let storage = Storage::new(
//!     Arc::new(local::new("./storage")),
//!     Url::parse("http://localhost:8080/uploads").expect("static url"),
//! );
//!
//! let uploaded = storage
//!     .upload_files(
//!         "images",
//!         vec![FileSource {
//!             filename: "cover.png".to_string(),
//!             content: Bytes::from_static(b"..."),
//!         }],
//!     )
//!     .await?;
//! println!("serving from {}", uploaded[0].url);
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod storage;

pub use storage::{
    FileSource, Storage, StorageError, StorageResult, StoreError, StoreResult, UploadedFile,
};
