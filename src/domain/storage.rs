use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Blob store failure; callers must not assume partial success
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
}

/// Object store holding uploaded media
///
/// Implementations write `bytes` under `key` and return the public URL the
/// object can be fetched from. There is no delete operation.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String, BlobError>;
}
