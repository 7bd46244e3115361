use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::storage::BlobError;
use crate::services::{AccountError, PhotoError};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// API error type with HTTP status code and message
///
/// Serialized as `{"message": ...}`. The upload endpoints report failures
/// under an `error` key instead; see [`ApiError::keyed_as_error`].
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    error_key: bool,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_key: false,
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 500 error; the cause is logged, the client gets a fixed message
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    /// Reports the message under `error` rather than `message`
    pub fn keyed_as_error(mut self) -> Self {
        self.error_key = true;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = if self.error_key {
            Json(json!({ "error": self.message }))
        } else {
            Json(json!({ "message": self.message }))
        };

        (self.status, body).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidInput(msg) => Self::bad_request(msg),
            AccountError::AlreadyExists => Self::bad_request("User already exists"),
            AccountError::NotFound => Self::not_found("User not found"),
            AccountError::BadPassword => Self::unauthorized("Incorrect password"),
            AccountError::IdentityRejected(msg) => {
                tracing::warn!(reason = %msg, "Facebook token rejected");
                Self::bad_request("Invalid Facebook access token")
            }
            other => Self::internal(other),
        }
    }
}

impl From<PhotoError> for ApiError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::NotFound => Self::not_found("Photo not found"),
            PhotoError::EmptyText => Self::bad_request("Comment text is required"),
            PhotoError::InvalidInput(msg) => Self::bad_request(msg),
            other => Self::internal(other),
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        Self::internal(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
