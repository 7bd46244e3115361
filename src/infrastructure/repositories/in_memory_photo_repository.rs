use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::RepositoryError;
use crate::domain::photo::{Comment, Photo};
use crate::domain::repositories::PhotoRepository;

/// Process-local PhotoRepository
///
/// Mutations run under the map's write lock, which serializes every
/// toggle and append against the same photo.
#[derive(Default)]
pub struct InMemoryPhotoRepository {
    photos: RwLock<HashMap<Uuid, Photo>>,
}

impl InMemoryPhotoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut photos: Vec<Photo>) -> Vec<Photo> {
    photos.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    photos
}

#[async_trait]
impl PhotoRepository for InMemoryPhotoRepository {
    async fn insert(&self, photo: &Photo) -> Result<(), RepositoryError> {
        let mut photos = self.photos.write().await;
        if photos.contains_key(&photo.id()) {
            return Err(RepositoryError::Conflict(format!(
                "photo already exists: {}",
                photo.id()
            )));
        }
        photos.insert(photo.id(), photo.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Photo>, RepositoryError> {
        Ok(self.photos.read().await.get(&id).cloned())
    }

    async fn list_recent(&self) -> Result<Vec<Photo>, RepositoryError> {
        let photos = self.photos.read().await.values().cloned().collect();
        Ok(newest_first(photos))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Photo>, RepositoryError> {
        let photos = self
            .photos
            .read()
            .await
            .values()
            .filter(|p| p.owner_id() == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(photos))
    }

    async fn toggle_like(
        &self,
        photo_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Vec<Uuid>>, RepositoryError> {
        let mut photos = self.photos.write().await;
        Ok(photos.get_mut(&photo_id).map(|photo| {
            photo.toggle_like(user_id);
            photo.likes().to_vec()
        }))
    }

    async fn push_comment(
        &self,
        photo_id: Uuid,
        comment: &Comment,
    ) -> Result<bool, RepositoryError> {
        let mut photos = self.photos.write().await;
        match photos.get_mut(&photo_id) {
            Some(photo) => {
                photo.append_comment(comment.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn comments_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<(Uuid, Comment)>, RepositoryError> {
        let photos = self.photos.read().await;
        let mut comments: Vec<_> = photos
            .values()
            .flat_map(|photo| {
                photo
                    .comments()
                    .iter()
                    .filter(|c| c.author_id == author_id)
                    .map(move |c| (photo.id(), c.clone()))
            })
            .collect();
        comments.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
        Ok(comments)
    }
}
