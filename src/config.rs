//! # Configuration Management
//!
//! Serde-deserializable settings for the storage layer. The consuming app
//! loads these from its environment configuration files and hands them to
//! [`Storage::from_config`](crate::storage::Storage::from_config) once at
//! startup; nothing here is re-read per call.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Storage configuration.
///
/// Example (development):
/// ```yaml
/// storage:
///   backend:
///     kind: local
///     path: ./storage
///     public_url: http://localhost:8080/uploads
/// ```
///
/// Example (production):
/// ```yaml
/// storage:
///   backend:
///     kind: s3
///     bucket: artstore-uploads
///     region: eu-central-1
///     public_endpoint: https://s3.eu-central-1.amazonaws.com
///   workers: 5
///   bulk_timeout_secs: 60
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// Which backend stores the bytes.
    pub backend: Backend,

    /// Fixed worker-pool size for bulk calls.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Deadline covering one entire bulk call, in seconds.
    #[serde(default = "default_bulk_timeout")]
    pub bulk_timeout_secs: u64,

    /// Timeout for a single-file call, in seconds.
    #[serde(default = "default_op_timeout")]
    pub op_timeout_secs: u64,
}

/// Storage backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// Bucket-style remote object store speaking the S3 API.
    S3 {
        bucket: String,
        region: Option<String>,
        /// Custom endpoint for S3-compatible services; switches the client
        /// to path-style addressing.
        #[serde(default)]
        endpoint: Option<String>,
        /// Public endpoint objects are served from; the bucket name is
        /// appended to form the URL base.
        public_endpoint: String,
    },
    /// Local filesystem under a base directory.
    Local {
        path: PathBuf,
        /// Public base URL the app serves the base directory under.
        public_url: String,
    },
}

fn default_workers() -> usize {
    5
}

fn default_bulk_timeout() -> u64 {
    60
}

fn default_op_timeout() -> u64 {
    10
}
