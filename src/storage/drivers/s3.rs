//! Remote bucket-style object store driver speaking the S3 API.
//!
//! Uploaded objects are granted public read access with a follow-up ACL
//! call. The grant is not atomic with the write: an object whose grant fails
//! stays stored but private, and the failure surfaces as a transfer error
//! with no rollback. Deletes are keyed to the object version observed just
//! before the call, so a concurrently overwritten object is not removed
//! blindly.
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::{StoreDriver, UploadResponse};
use crate::storage::error::{StoreError, StoreResult};

pub struct S3Store {
    client: Client,
    bucket: String,
}

/// Create new bucket storage.
///
/// Credentials come from the ambient AWS credential chain. A custom
/// `endpoint` switches the client to an S3-compatible service and forces
/// path-style addressing.
pub async fn new(bucket: &str, region: Option<&str>, endpoint: Option<&str>) -> S3Store {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    let shared = loader.load().await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint) = endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }

    S3Store {
        client: Client::from_conf(builder.build()),
        bucket: bucket.to_string(),
    }
}

fn remote_err<E>(err: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::Any(Box::new(err))
}

#[async_trait]
impl StoreDriver for S3Store {
    async fn upload(&self, key: &str, content: &Bytes) -> StoreResult<UploadResponse> {
        let content_type = mime_guess::from_path(key).first_or_octet_stream();
        let put = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type.essence_str())
            .body(ByteStream::from(content.clone()))
            .send()
            .await
            .map_err(remote_err)?;

        // The object exists but stays private until this grant lands.
        if let Err(err) = self
            .client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
        {
            tracing::warn!(key, "object stored but public-read grant failed");
            return Err(remote_err(err));
        }

        Ok(UploadResponse {
            e_tag: put.e_tag().map(ToString::to_string),
            version: put.version_id().map(ToString::to_string),
        })
    }

    /// Reads the current object version first and deletes exactly that
    /// version.
    async fn delete(&self, key: &str) -> StoreResult<()> {
        let version = match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(head) => head.version_id().map(ToString::to_string),
            Err(err) if err.as_service_error().is_some_and(HeadObjectError::is_not_found) => {
                return Err(StoreError::NotFound(key.to_string()));
            }
            Err(err) => return Err(remote_err(err)),
        };

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .set_version_id(version)
            .send()
            .await
            .map_err(remote_err)?;
        Ok(())
    }
}
