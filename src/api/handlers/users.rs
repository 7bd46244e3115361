use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;

use super::parse_id;
use crate::api::dto::{
    AuthoredCommentResponse, PhotoResponse, PublicProfileResponse, UserResponse,
};
use crate::api::errors::ApiError;
use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::domain::user::ProfileUpdate;

/// Request body for profile updates
///
/// Omitted or null fields are left untouched; present values are stored as
/// sent, including empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            name: req.name,
            description: req.description,
            location: req.location,
            profile_picture_url: req.profile_picture.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// GET /api/user
pub async fn get_current_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.accounts.find_by_id(user_id).await?;
    Ok(Json(user.into()))
}

/// PUT /api/user
pub async fn update_current_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(req) = payload?;
    let user = state
        .accounts
        .update_profile(user_id, req.into())
        .await?;
    Ok(Json(user.into()))
}

/// GET /api/user/photos
pub async fn list_my_photos(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<PhotoResponse>>, ApiError> {
    let photos = state.photos.list_by_owner(user_id).await?;
    Ok(Json(photos.into_iter().map(Into::into).collect()))
}

/// GET /api/user/comments
pub async fn list_my_comments(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<AuthoredCommentResponse>>, ApiError> {
    let comments = state.photos.comments_by_author(user_id).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let id = parse_id(&id, "user")?;
    let user = state.accounts.find_by_id(id).await?;
    Ok(Json(user.into()))
}
