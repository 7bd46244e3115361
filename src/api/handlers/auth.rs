use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::services::AccountError;

/// Request body for `POST /api/auth`, discriminated by `action`
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AuthRequest {
    Register { email: String, password: String },
    Login { email: String, password: String },
}

/// Response from successful registration or login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookLoginRequest {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Register or log in with email and password
///
/// POST /api/auth
pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(req) = payload?;

    match req {
        AuthRequest::Register { email, password } => {
            let session = state.accounts.register(&email, &password).await?;
            Ok((
                StatusCode::CREATED,
                Json(AuthResponse {
                    message: "User registered successfully".to_string(),
                    token: session.token,
                }),
            ))
        }
        AuthRequest::Login { email, password } => {
            let session = state
                .accounts
                .login(&email, &password)
                .await
                .map_err(login_error)?;
            Ok((
                StatusCode::OK,
                Json(AuthResponse {
                    message: "Login successful".to_string(),
                    token: session.token,
                }),
            ))
        }
    }
}

/// Unknown emails are a bad request on login, not a missing resource
fn login_error(err: AccountError) -> ApiError {
    match err {
        AccountError::NotFound => ApiError::bad_request("User not found"),
        other => other.into(),
    }
}

/// Exchange a Facebook access token for an API token
///
/// POST /api/auth/facebook
pub async fn facebook_login(
    State(state): State<AppState>,
    payload: Result<Json<FacebookLoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload?;
    let session = state.accounts.login_with_facebook(&req.access_token).await?;

    Ok(Json(TokenResponse {
        token: session.token,
    }))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
