use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::domain::storage::{BlobError, BlobStore};

/// Filesystem-backed object store for local development
///
/// Objects are written below `root` and served by the router under the
/// configured public URL.
pub struct LocalBlobStore {
    root: PathBuf,
    public_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(BlobError::UploadFailed(format!("unsafe object key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, _content_type: &str) -> Result<String, BlobError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobError::UploadFailed(format!("create {}: {e}", parent.display())))?;
        }
        fs::write(&path, &bytes)
            .await
            .map_err(|e| BlobError::UploadFailed(format!("write {}: {e}", path.display())))?;

        Ok(format!("{}/{}", self.public_url, key))
    }
}
