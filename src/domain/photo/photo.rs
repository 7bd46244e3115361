use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::comment::Comment;

/// Photo aggregate root
///
/// Likes and comments are embedded sub-collections and only change through
/// the aggregate's own operations.
///
/// # Invariants
/// - `image_url` and `owner_id` never change after creation
/// - `likes` holds each user id at most once
/// - `comments` only grows, in append order
///
/// # Example
/// ```
/// use fotoutc_api::domain::photo::Photo;
/// use uuid::Uuid;
///
/// let mut photo = Photo::new(
///     Uuid::new_v4(),
///     "https://bucket.s3.us-east-1.amazonaws.com/photos/1-sunset.jpg".to_string(),
///     "sunset".to_string(),
///     "Pachuca".to_string(),
/// );
///
/// let user = Uuid::new_v4();
/// assert!(photo.toggle_like(user));
/// assert!(!photo.toggle_like(user));
/// assert!(photo.likes().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    id: Uuid,
    image_url: String,
    description: String,
    location: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    likes: Vec<Uuid>,
    comments: Vec<Comment>,
}

impl Photo {
    /// Creates a new photo with no likes and no comments
    pub fn new(owner_id: Uuid, image_url: String, description: String, location: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_url,
            description,
            location,
            owner_id,
            created_at: Utc::now(),
            likes: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Reconstructs a photo from stored state
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        image_url: String,
        description: String,
        location: String,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
        likes: Vec<Uuid>,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id,
            image_url,
            description,
            location,
            owner_id,
            created_at,
            likes,
            comments,
        }
    }

    /// Flips `user_id`'s membership in the like set
    ///
    /// Returns `true` if the user now likes the photo.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        if let Some(index) = self.likes.iter().position(|id| *id == user_id) {
            self.likes.remove(index);
            false
        } else {
            self.likes.push(user_id);
            true
        }
    }

    /// Appends a comment to the end of the sequence
    pub fn append_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn likes(&self) -> &[Uuid] {
        &self.likes
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Whether `user_id` currently likes the photo
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }
}
