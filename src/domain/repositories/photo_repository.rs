use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::RepositoryError;
use crate::domain::photo::{Comment, Photo};

/// Repository trait for the Photo aggregate
///
/// `toggle_like` and `push_comment` must each be applied atomically to the
/// stored document: concurrent calls from different users are all reflected
/// and the like set never holds duplicates.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Insert a newly created photo
    async fn insert(&self, photo: &Photo) -> Result<(), RepositoryError>;

    /// Find a photo by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Photo>, RepositoryError>;

    /// All photos, newest first
    async fn list_recent(&self) -> Result<Vec<Photo>, RepositoryError>;

    /// Photos uploaded by `owner_id`, newest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Photo>, RepositoryError>;

    /// Remove `user_id` from the like set if present, add it otherwise
    ///
    /// Returns the resulting like set, or `None` if the photo does not exist.
    async fn toggle_like(
        &self,
        photo_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Vec<Uuid>>, RepositoryError>;

    /// Append `comment` to the photo's comments
    ///
    /// Returns `false` if the photo does not exist.
    async fn push_comment(&self, photo_id: Uuid, comment: &Comment)
        -> Result<bool, RepositoryError>;

    /// Every comment written by `author_id`, paired with its photo id
    async fn comments_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<(Uuid, Comment)>, RepositoryError>;
}
