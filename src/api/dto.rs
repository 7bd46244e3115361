// Response bodies shared by the handlers. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::photo::Comment;
use crate::domain::user::{User, UserSummary};
use crate::services::{AuthoredComment, PhotoView};

/// Account as seen by its owner; never carries the password hash
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub profile_picture: Option<String>,
    pub has_facebook: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            name: user.name,
            description: user.description,
            location: user.location,
            profile_picture: user.profile_picture_url,
            has_facebook: user.facebook_id.is_some(),
            created_at: user.created_at,
        }
    }
}

/// Profile visible to other users
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub profile_picture: Option<String>,
}

impl From<User> for PublicProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            description: user.description,
            location: user.location,
            profile_picture: user.profile_picture_url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub profile_picture: Option<String>,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(summary: UserSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            profile_picture: summary.profile_picture_url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author: Option<UserSummaryResponse>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: Comment, author: Option<UserSummary>) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id,
            author: author.map(Into::into),
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub id: Uuid,
    pub image_url: String,
    pub description: String,
    pub location: String,
    pub owner_id: Uuid,
    pub owner: Option<UserSummaryResponse>,
    pub created_at: DateTime<Utc>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentResponse>,
}

impl From<PhotoView> for PhotoResponse {
    fn from(view: PhotoView) -> Self {
        let photo = view.photo;
        let comments = photo
            .comments()
            .iter()
            .cloned()
            .zip(view.comment_authors)
            .map(|(comment, author)| CommentResponse::new(comment, author))
            .collect();

        Self {
            id: photo.id(),
            image_url: photo.image_url().to_string(),
            description: photo.description().to_string(),
            location: photo.location().to_string(),
            owner_id: photo.owner_id(),
            owner: view.owner.map(Into::into),
            created_at: photo.created_at(),
            likes: photo.likes().to_vec(),
            comments,
        }
    }
}

/// A comment listed on its author's profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredCommentResponse {
    pub photo_id: Uuid,
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<AuthoredComment> for AuthoredCommentResponse {
    fn from(authored: AuthoredComment) -> Self {
        Self {
            photo_id: authored.photo_id,
            id: authored.comment.id,
            text: authored.comment.text,
            created_at: authored.comment.created_at,
        }
    }
}
