use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id;
use super::uploads::read_form;
use crate::api::dto::{CommentResponse, PhotoResponse};
use crate::api::errors::ApiError;
use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::domain::user::UserSummary;
use crate::services::PhotoView;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub message: String,
    pub likes: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CommentCreatedResponse {
    pub message: String,
    pub comment: CommentResponse,
}

/// Feed of all photos, newest first
///
/// GET /api/photos
pub async fn list_photos(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<Vec<PhotoResponse>>, ApiError> {
    let photos = state.photos.list().await?;
    Ok(Json(photos.into_iter().map(Into::into).collect()))
}

/// Upload a photo with its description and location
///
/// POST /api/photos
pub async fn create_photo(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<PhotoResponse>), ApiError> {
    let mut form = read_form(multipart).await?;
    let upload = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("No file uploaded").keyed_as_error())?;
    let description = form.take_field("description");
    let location = form.take_field("location");

    let photo = state
        .photos
        .create(user_id, upload, description, location)
        .await
        .map_err(|e| ApiError::from(e).keyed_as_error())?;
    let view = PhotoView {
        photo,
        owner: caller_summary(&state, user_id).await,
        comment_authors: Vec::new(),
    };

    Ok((StatusCode::CREATED, Json(view.into())))
}

/// GET /api/photos/:id
pub async fn get_photo(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let id = parse_id(&id, "photo")?;
    let view = state.photos.get(id).await?;
    Ok(Json(view.into()))
}

/// Like the photo, or remove the caller's like
///
/// POST /api/photos/:id/like
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let id = parse_id(&id, "photo")?;
    let likes = state.photos.toggle_like(id, user_id).await?;

    let message = if likes.contains(&user_id) {
        "Photo liked"
    } else {
        "Photo unliked"
    };
    Ok(Json(LikeResponse {
        message: message.to_string(),
        likes,
    }))
}

/// POST /api/photos/:id/comment
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentCreatedResponse>), ApiError> {
    let id = parse_id(&id, "photo")?;
    let Json(req) = payload?;

    let comment = state.photos.add_comment(id, user_id, &req.text).await?;
    let author = caller_summary(&state, user_id).await;

    Ok((
        StatusCode::CREATED,
        Json(CommentCreatedResponse {
            message: "Comment added".to_string(),
            comment: CommentResponse::new(comment, author),
        }),
    ))
}

/// Summary of the caller for a response body
///
/// Runs after the write has been stored, so a failed lookup only drops the
/// summary from the response.
async fn caller_summary(state: &AppState, user_id: Uuid) -> Option<UserSummary> {
    match state.accounts.find_by_id(user_id).await {
        Ok(user) => Some(user.summary()),
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Caller lookup failed");
            None
        }
    }
}
