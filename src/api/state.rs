use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::jwt::TokenService;
use crate::services::{AccountService, MediaService, PhotoService};

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub photos: Arc<PhotoService>,
    pub media: Arc<MediaService>,
    pub tokens: TokenService,
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
