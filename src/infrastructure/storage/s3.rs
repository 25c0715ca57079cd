use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::{Client, config::BehaviorVersion, config::Credentials, config::Region};
use bytes::Bytes;
use tracing::{debug, info};

use super::{BlobStore, StorageError, Visibility};

/// S3-compatible object store (DigitalOcean Spaces, MinIO, AWS).
#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
    pub bucket: String,
}

impl StorageService {
    pub fn new(
        endpoint: &str,
        region: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(config);

        info!(endpoint, bucket, "✅ Object storage client ready");

        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for StorageService {
    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service_error) if service_error.is_no_such_key() => StorageError::NotFound {
                    key: key.to_string(),
                },
                _ => StorageError::backend(DisplayErrorContext(&e).to_string()),
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::backend(format!("failed to read object body: {}", e)))?
            .into_bytes();

        debug!(key, size = data.len(), "Fetched object");
        Ok(data)
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        let size = body.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body));

        match visibility {
            Visibility::PublicRead => request = request.acl(ObjectCannedAcl::PublicRead),
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::backend(DisplayErrorContext(&e).to_string()))?;

        debug!(key, size, content_type, "Stored object");
        Ok(())
    }
}
