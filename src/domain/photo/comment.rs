use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment text value object
///
/// # Invariants
/// - Not empty after trimming surrounding whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentText(String);

impl CommentText {
    /// Validates comment text; the original (untrimmed) text is kept
    pub fn new(text: impl Into<String>) -> Result<Self, String> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err("Comment text is required".to_string());
        }
        Ok(CommentText(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Comment embedded in a photo
///
/// Serialized as-is into the photo's stored comment array, so field names
/// here are the storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment with a server-assigned id and timestamp
    pub fn new(author_id: Uuid, text: CommentText) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            text: text.into_inner(),
            created_at: Utc::now(),
        }
    }
}
