// Photo aggregate operations: creation with upload, feed reads with
// denormalized users, like toggling and comment appends.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::RepositoryError;
use crate::domain::photo::{Comment, CommentText, Photo};
use crate::domain::repositories::{PhotoRepository, UserRepository};
use crate::domain::storage::BlobError;
use crate::domain::user::UserSummary;
use crate::services::media::{MediaFolder, MediaService, Upload};

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("photo not found")]
    NotFound,

    #[error("comment text is required")]
    EmptyText,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Upload(#[from] BlobError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Photo with the user fields needed for display
///
/// `comment_authors` is index-aligned with `photo.comments()`. Entries are
/// `None` when the referenced user no longer resolves.
#[derive(Debug, Clone)]
pub struct PhotoView {
    pub photo: Photo,
    pub owner: Option<UserSummary>,
    pub comment_authors: Vec<Option<UserSummary>>,
}

/// Comment written by a user, with the photo it belongs to
#[derive(Debug, Clone)]
pub struct AuthoredComment {
    pub photo_id: Uuid,
    pub comment: Comment,
}

pub struct PhotoService {
    photos: Arc<dyn PhotoRepository>,
    users: Arc<dyn UserRepository>,
    media: Arc<MediaService>,
}

impl PhotoService {
    pub fn new(
        photos: Arc<dyn PhotoRepository>,
        users: Arc<dyn UserRepository>,
        media: Arc<MediaService>,
    ) -> Self {
        Self {
            photos,
            users,
            media,
        }
    }

    /// Uploads the image, then inserts the photo
    ///
    /// Nothing is inserted unless the upload produced a URL. If the insert
    /// fails afterwards the uploaded object stays orphaned in the store.
    pub async fn create(
        &self,
        owner_id: Uuid,
        upload: Upload,
        description: String,
        location: String,
    ) -> Result<Photo, PhotoError> {
        if upload.bytes.is_empty() {
            return Err(PhotoError::InvalidInput("Uploaded file is empty".to_string()));
        }

        let stored = self.media.store(upload, MediaFolder::Photos).await?;
        let photo = Photo::new(owner_id, stored.url, description, location);

        if let Err(e) = self.photos.insert(&photo).await {
            tracing::warn!(
                key = %stored.key,
                error = %e,
                "Photo insert failed, uploaded object orphaned"
            );
            return Err(e.into());
        }

        tracing::info!(photo_id = %photo.id(), owner_id = %owner_id, "Photo created");
        Ok(photo)
    }

    /// Feed of every photo, newest first
    pub async fn list(&self) -> Result<Vec<PhotoView>, PhotoError> {
        let photos = self.photos.list_recent().await?;
        self.denormalize(photos).await
    }

    /// Photos uploaded by `owner_id`, newest first
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PhotoView>, PhotoError> {
        let photos = self.photos.list_by_owner(owner_id).await?;
        self.denormalize(photos).await
    }

    pub async fn get(&self, photo_id: Uuid) -> Result<PhotoView, PhotoError> {
        let photo = self
            .photos
            .find_by_id(photo_id)
            .await?
            .ok_or(PhotoError::NotFound)?;

        self.denormalize(vec![photo])
            .await?
            .pop()
            .ok_or(PhotoError::NotFound)
    }

    /// Adds `user_id` to the like set, or removes it if already present
    pub async fn toggle_like(
        &self,
        photo_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, PhotoError> {
        let likes = self
            .photos
            .toggle_like(photo_id, user_id)
            .await?
            .ok_or(PhotoError::NotFound)?;

        tracing::debug!(
            photo_id = %photo_id,
            user_id = %user_id,
            liked = likes.contains(&user_id),
            "Like toggled"
        );
        Ok(likes)
    }

    /// Appends a comment; blank text is rejected before the store is touched
    pub async fn add_comment(
        &self,
        photo_id: Uuid,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment, PhotoError> {
        let text = CommentText::new(text).map_err(|_| PhotoError::EmptyText)?;
        let comment = Comment::new(author_id, text);

        if !self.photos.push_comment(photo_id, &comment).await? {
            return Err(PhotoError::NotFound);
        }

        tracing::info!(photo_id = %photo_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    /// Comments written by `author_id`, newest first
    pub async fn comments_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<AuthoredComment>, PhotoError> {
        Ok(self
            .photos
            .comments_by_author(author_id)
            .await?
            .into_iter()
            .map(|(photo_id, comment)| AuthoredComment { photo_id, comment })
            .collect())
    }

    /// Joins owner and comment author summaries in one user lookup
    async fn denormalize(&self, photos: Vec<Photo>) -> Result<Vec<PhotoView>, PhotoError> {
        let ids: HashSet<Uuid> = photos
            .iter()
            .flat_map(|p| {
                std::iter::once(p.owner_id()).chain(p.comments().iter().map(|c| c.author_id))
            })
            .collect();
        let ids: Vec<Uuid> = ids.into_iter().collect();

        let users: HashMap<Uuid, UserSummary> = self
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.summary()))
            .collect();

        Ok(photos
            .into_iter()
            .map(|photo| PhotoView {
                owner: users.get(&photo.owner_id()).cloned(),
                comment_authors: photo
                    .comments()
                    .iter()
                    .map(|c| users.get(&c.author_id).cloned())
                    .collect(),
                photo,
            })
            .collect())
    }
}
