use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod s3;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

impl StorageError {
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Access level attached to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Canned `public-read` ACL; every derivative is served directly.
    PublicRead,
}

/// Minimal get/put view of the object store used by media jobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError>;
}
