use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{auth, photos, uploads, users};
use super::state::AppState;

/// Builds the application router
///
/// `media_dir` mounts the local blob directory at `/media` when files are
/// stored on disk.
pub fn build_router(state: AppState, max_upload_bytes: usize, media_dir: Option<&Path>) -> Router {
    let api = Router::new()
        // Auth routes
        .route("/auth", post(auth::authenticate))
        .route("/auth/facebook", post(auth::facebook_login))
        // Current user
        .route(
            "/user",
            get(users::get_current_user).put(users::update_current_user),
        )
        .route("/user/photos", get(users::list_my_photos))
        .route("/user/comments", get(users::list_my_comments))
        .route("/users/:id", get(users::get_user))
        // Photo routes
        .route("/photos", get(photos::list_photos).post(photos::create_photo))
        .route("/photos/:id", get(photos::get_photo))
        .route("/photos/:id/like", post(photos::toggle_like))
        .route("/photos/:id/comment", post(photos::add_comment))
        .route("/upload", post(uploads::upload_file));

    let mut router = Router::new()
        .route("/health", get(auth::health_check))
        .nest("/api", api);

    if let Some(dir) = media_dir {
        router = router.nest_service("/media", ServeDir::new(dir));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
