// Blob Store Gateway: derives object keys and hands bytes to the store.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;

use crate::domain::storage::{BlobError, BlobStore};

const MAX_FILE_NAME_LEN: usize = 100;

/// Binary content received from a client
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Bytes,
    /// Client-suggested file name, sanitized before use in a key
    pub file_name: String,
    pub content_type: String,
}

/// Top-level key prefix for an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    Photos,
    ProfilePictures,
}

impl MediaFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaFolder::Photos => "photos",
            MediaFolder::ProfilePictures => "profile-pictures",
        }
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub key: String,
    pub url: String,
}

/// Uploads media under `<folder>/<millis>-<name>` keys
///
/// `millis` comes from a per-process monotonic clock, so two uploads never
/// share a prefix even within the same millisecond. Identical content
/// uploaded twice is stored twice.
pub struct MediaService {
    store: Arc<dyn BlobStore>,
    last_millis: AtomicI64,
}

impl MediaService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            last_millis: AtomicI64::new(0),
        }
    }

    /// Stores `upload` and returns its key and public URL
    pub async fn store(
        &self,
        upload: Upload,
        folder: MediaFolder,
    ) -> Result<StoredBlob, BlobError> {
        let key = self.object_key(folder, &upload.file_name);
        let size = upload.bytes.len();

        let url = self
            .store
            .put(&key, upload.bytes, &upload.content_type)
            .await?;

        tracing::info!(key = %key, size, content_type = %upload.content_type, "Stored upload");
        Ok(StoredBlob { key, url })
    }

    /// Builds the object key for a new upload
    pub fn object_key(&self, folder: MediaFolder, file_name: &str) -> String {
        format!(
            "{}/{}-{}",
            folder.as_str(),
            self.next_millis(),
            sanitize_file_name(file_name)
        )
    }

    fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = match self.last_millis.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |last| Some(now.max(last + 1)),
        ) {
            Ok(previous) | Err(previous) => previous,
        };
        now.max(previous + 1)
    }
}

/// Reduces a client file name to `[A-Za-z0-9._-]`, without directories
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .take(MAX_FILE_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
