//! End-to-end API integration tests
//!
//! These tests drive the full router over in-memory repositories, a
//! temporary local blob directory and a stub identity provider:
//! - Registration, login and Facebook login
//! - Bearer authentication on protected endpoints
//! - Photo creation, feed, likes and comments
//! - Profile reads and updates, generic uploads

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fotoutc_api::api::{build_router, AppState};
use fotoutc_api::auth::jwt::TokenService;
use fotoutc_api::auth::password::MIN_BCRYPT_COST;
use fotoutc_api::domain::errors::RepositoryError;
use fotoutc_api::domain::identity::{ExternalProfile, IdentityError, IdentityProvider};
use fotoutc_api::domain::photo::{Comment, Photo};
use fotoutc_api::domain::repositories::PhotoRepository;
use fotoutc_api::infrastructure::blob::LocalBlobStore;
use fotoutc_api::infrastructure::repositories::{InMemoryPhotoRepository, InMemoryUserRepository};
use fotoutc_api::services::{AccountService, MediaService, PhotoService};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for oneshot
use uuid::Uuid;

const SECRET: &str = "integration-test-secret";
const BOUNDARY: &str = "fotoutc-test-boundary";

/// Accepts "good-token" and "nameless-token", rejects everything else
struct StubFacebook;

#[async_trait]
impl IdentityProvider for StubFacebook {
    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, IdentityError> {
        match access_token {
            "good-token" => Ok(ExternalProfile {
                provider_id: "fb-1001".to_string(),
                name: Some("Ana Facebook".to_string()),
                email: Some("ana.fb@example.com".to_string()),
            }),
            "nameless-token" => Ok(ExternalProfile {
                provider_id: "fb-1002".to_string(),
                name: None,
                email: Some("sin.nombre@example.com".to_string()),
            }),
            _ => Err(IdentityError::Rejected("Invalid OAuth access token".to_string())),
        }
    }
}

/// Photo store whose single-photo reads always fail
struct FailingReads(InMemoryPhotoRepository);

#[async_trait]
impl PhotoRepository for FailingReads {
    async fn insert(&self, photo: &Photo) -> Result<(), RepositoryError> {
        self.0.insert(photo).await
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Photo>, RepositoryError> {
        Err(RepositoryError::Database("read replica unavailable".to_string()))
    }

    async fn list_recent(&self) -> Result<Vec<Photo>, RepositoryError> {
        self.0.list_recent().await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Photo>, RepositoryError> {
        self.0.list_by_owner(owner_id).await
    }

    async fn toggle_like(
        &self,
        photo_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Vec<Uuid>>, RepositoryError> {
        self.0.toggle_like(photo_id, user_id).await
    }

    async fn push_comment(
        &self,
        photo_id: Uuid,
        comment: &Comment,
    ) -> Result<bool, RepositoryError> {
        self.0.push_comment(photo_id, comment).await
    }

    async fn comments_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<(Uuid, Comment)>, RepositoryError> {
        self.0.comments_by_author(author_id).await
    }
}

struct TestApp {
    router: Router,
    tokens: TokenService,
    _media: TempDir,
}

/// Setup test application with in-memory stores
fn setup_app() -> TestApp {
    setup_app_with(Arc::new(InMemoryPhotoRepository::new()))
}

fn setup_app_with(photos: Arc<dyn PhotoRepository>) -> TestApp {
    let media = tempfile::tempdir().expect("create media dir");
    let users = Arc::new(InMemoryUserRepository::new());
    let store = Arc::new(LocalBlobStore::new(media.path(), "http://localhost:3000/media"));
    let media_service = Arc::new(MediaService::new(store));
    let tokens = TokenService::new(SECRET);

    let state = AppState {
        accounts: Arc::new(AccountService::new(
            users.clone(),
            Arc::new(StubFacebook),
            tokens.clone(),
            MIN_BCRYPT_COST,
        )),
        photos: Arc::new(PhotoService::new(photos, users, media_service.clone())),
        media: media_service,
        tokens: tokens.clone(),
    };

    TestApp {
        router: build_router(state, 1024 * 1024, Some(media.path())),
        tokens,
        _media: media,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_request(
    uri: &str,
    token: &str,
    file: Option<&[u8]>,
    fields: &[(&str, &str)],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"file\"; filename=\"sunset.jpg\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Registers a user and returns its token
async fn register(app: &TestApp, email: &str) -> String {
    let (status, json) = send(
        app,
        json_request(
            "POST",
            "/api/auth",
            None,
            json!({"action": "register", "email": email, "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["token"].as_str().unwrap().to_string()
}

async fn create_photo(app: &TestApp, token: &str) -> Value {
    let (status, json) = send(
        app,
        multipart_request(
            "/api/photos",
            token,
            Some(&b"\xff\xd8\xff\xe0jpeg"[..]),
            &[("description", "sunset"), ("location", "Pachuca")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app();

    let response = app
        .router
        .clone()
        .oneshot(get_request("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_register_and_login_flow() {
    let app = setup_app();

    // Step 1: Register user
    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/auth",
            None,
            json!({"action": "register", "email": "Ana@Example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "User registered successfully");
    let registered_id = app.tokens.verify(json["token"].as_str().unwrap()).unwrap();

    // Step 2: Login with the same credentials, differently cased
    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/auth",
            None,
            json!({"action": "login", "email": "ana@example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Login successful");
    let token = json["token"].as_str().unwrap();
    assert_eq!(app.tokens.verify(token).unwrap(), registered_id);

    // Step 3: Access the profile with the token
    let (status, json) = send(&app, get_request("/api/user", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], registered_id.to_string());
    assert_eq!(json["email"], "ana@example.com");
    assert!(json.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = setup_app();
    register(&app, "ana@example.com").await;

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/auth",
            None,
            json!({"action": "login", "email": "ana@example.com", "password": "wrong-pass"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Incorrect password");
    assert!(json.get("token").is_none());
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = setup_app();

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/auth",
            None,
            json!({"action": "login", "email": "nobody@example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "User not found");
    assert!(json.get("token").is_none());

    // Profile lookups still report a missing user as 404
    let token = app.tokens.issue(Uuid::new_v4()).unwrap();
    let (status, _) = send(&app, get_request("/api/user", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = setup_app();
    register(&app, "ana@example.com").await;

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/auth",
            None,
            json!({"action": "register", "email": "ANA@example.com", "password": "other-pass"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "User already exists");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = setup_app();

    let cases = [
        json!({"action": "register", "email": "not-an-email", "password": "secret123"}),
        json!({"action": "register", "email": "ana@example.com", "password": "short"}),
        json!({"action": "delete", "email": "ana@example.com", "password": "secret123"}),
        json!({"email": "ana@example.com", "password": "secret123"}),
    ];
    for body in cases {
        let (status, json) = send(&app, json_request("POST", "/api/auth", None, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].is_string());
    }
}

#[tokio::test]
async fn test_facebook_login_creates_then_reuses_account() {
    let app = setup_app();

    let (status, first) = send(
        &app,
        json_request("POST", "/api/auth/facebook", None, json!({"accessToken": "good-token"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let first_id = app.tokens.verify(first["token"].as_str().unwrap()).unwrap();

    let (_, second) = send(
        &app,
        json_request("POST", "/api/auth/facebook", None, json!({"accessToken": "good-token"})),
    )
    .await;
    let second_id = app.tokens.verify(second["token"].as_str().unwrap()).unwrap();
    assert_eq!(first_id, second_id);

    let (_, profile) = send(&app, get_request("/api/user", second["token"].as_str())).await;
    assert_eq!(profile["name"], "Ana Facebook");
    assert_eq!(profile["hasFacebook"], true);
}

#[tokio::test]
async fn test_facebook_login_rejected_token() {
    let app = setup_app();

    let (status, json) = send(
        &app,
        json_request("POST", "/api/auth/facebook", None, json!({"accessToken": "stolen"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("token").is_none());
}

#[tokio::test]
async fn test_protected_endpoints_require_token() {
    let app = setup_app();

    for uri in ["/api/user", "/api/photos", "/api/user/photos", "/api/user/comments"] {
        let (status, json) = send(&app, get_request(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert!(json["message"].is_string());
    }

    let (status, _) = send(&app, get_request("/api/photos", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = setup_app();
    let expired = app
        .tokens
        .issue_at(Uuid::new_v4(), chrono::Utc::now() - chrono::Duration::hours(2))
        .unwrap();

    let (status, json) = send(&app, get_request("/api/photos", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Token has expired");
}

#[tokio::test]
async fn test_create_photo_appears_in_feed() {
    let app = setup_app();
    let token = register(&app, "ana@example.com").await;

    let photo = create_photo(&app, &token).await;
    assert_eq!(photo["description"], "sunset");
    assert_eq!(photo["location"], "Pachuca");
    assert_eq!(photo["likes"], json!([]));
    assert_eq!(photo["comments"], json!([]));
    let image_url = photo["imageUrl"].as_str().unwrap();
    assert!(image_url.starts_with("http://localhost:3000/media/photos/"));
    assert!(image_url.ends_with("-sunset.jpg"));

    let (status, feed) = send(&app, get_request("/api/photos", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["id"], photo["id"]);
    assert_eq!(feed[0]["owner"]["name"], "ana");

    // The stored file is served back under /media
    let path = image_url.trim_start_matches("http://localhost:3000");
    let response = app
        .router
        .clone()
        .oneshot(get_request(path, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_photo_without_file() {
    let app = setup_app();
    let token = register(&app, "ana@example.com").await;

    let (status, json) = send(
        &app,
        multipart_request("/api/photos", &token, None, &[("description", "sunset")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file uploaded");

    let (_, feed) = send(&app, get_request("/api/photos", Some(&token))).await;
    assert_eq!(feed, json!([]));
}

#[tokio::test]
async fn test_toggle_like_twice() {
    let app = setup_app();
    let token = register(&app, "ana@example.com").await;
    let user_id = app.tokens.verify(&token).unwrap().to_string();
    let photo = create_photo(&app, &token).await;
    let uri = format!("/api/photos/{}/like", photo["id"].as_str().unwrap());

    let (status, json) = send(&app, json_request("POST", &uri, Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Photo liked");
    assert_eq!(json["likes"], json!([user_id]));

    let (_, json) = send(&app, json_request("POST", &uri, Some(&token), json!({}))).await;
    assert_eq!(json["message"], "Photo unliked");
    assert_eq!(json["likes"], json!([]));
}

#[tokio::test]
async fn test_concurrent_likes_from_two_users() {
    let app = setup_app();
    let ana = register(&app, "ana@example.com").await;
    let luis = register(&app, "luis@example.com").await;
    let photo = create_photo(&app, &ana).await;
    let id = photo["id"].as_str().unwrap();
    let uri = format!("/api/photos/{}/like", id);

    let (a, b) = tokio::join!(
        send(&app, json_request("POST", &uri, Some(&ana), json!({}))),
        send(&app, json_request("POST", &uri, Some(&luis), json!({})))
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);

    let (_, stored) = send(&app, get_request(&format!("/api/photos/{}", id), Some(&ana))).await;
    assert_eq!(stored["likes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_like_malformed_id() {
    let app = setup_app();
    let token = register(&app, "ana@example.com").await;

    let (status, json) = send(
        &app,
        json_request("POST", "/api/photos/abc/like", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid photo id");
}

#[tokio::test]
async fn test_comment_unknown_photo() {
    let app = setup_app();
    let token = register(&app, "ana@example.com").await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/photos/{}/comment", Uuid::new_v4()),
            Some(&token),
            json!({"text": "hola"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments_flow() {
    let app = setup_app();
    let ana = register(&app, "ana@example.com").await;
    let luis = register(&app, "luis@example.com").await;
    let photo = create_photo(&app, &ana).await;
    let id = photo["id"].as_str().unwrap();
    let uri = format!("/api/photos/{}/comment", id);

    // Blank text is rejected and nothing is stored
    let blank = json_request("POST", &uri, Some(&luis), json!({"text": "  "}));
    let (status, json) = send(&app, blank).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Comment text is required");

    let comment = json_request("POST", &uri, Some(&luis), json!({"text": "bonita"}));
    let (status, json) = send(&app, comment).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Comment added");
    assert_eq!(json["comment"]["text"], "bonita");
    assert_eq!(json["comment"]["author"]["name"], "luis");

    let (_, stored) = send(&app, get_request(&format!("/api/photos/{}", id), Some(&ana))).await;
    let comments = stored["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["authorId"], json["comment"]["authorId"]);

    let (_, mine) = send(&app, get_request("/api/user/comments", Some(&luis))).await;
    assert_eq!(mine[0]["photoId"], id);
    assert_eq!(mine[0]["text"], "bonita");
}

#[tokio::test]
async fn test_profile_update_and_public_profile() {
    let app = setup_app();
    let token = register(&app, "ana@example.com").await;
    let user_id = app.tokens.verify(&token).unwrap();

    let (status, json) = send(
        &app,
        json_request(
            "PUT",
            "/api/user",
            Some(&token),
            json!({"name": "Ana Maria", "location": "Tula"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Ana Maria");
    assert_eq!(json["location"], "Tula");
    assert_eq!(json["description"], "");

    let other = register(&app, "luis@example.com").await;
    let profile_uri = format!("/api/users/{}", user_id);
    let (status, public) = send(&app, get_request(&profile_uri, Some(&other))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["name"], "Ana Maria");
    assert!(public.get("email").is_none());

    let (status, _) = send(&app, get_request("/api/users/nope", Some(&other))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let unknown_uri = format!("/api/users/{}", Uuid::new_v4());
    let (status, _) = send(&app, get_request(&unknown_uri, Some(&other))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_profile_picture() {
    let app = setup_app();
    let token = register(&app, "ana@example.com").await;

    let (status, json) = send(
        &app,
        multipart_request("/api/upload", &token, Some(&b"\x89PNG"[..]), &[]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let key = json["key"].as_str().unwrap();
    assert!(key.starts_with("profile-pictures/"));
    assert_eq!(json["url"], format!("http://localhost:3000/media/{}", key));

    let (status, json) = send(&app, multipart_request("/api/upload", &token, None, &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file uploaded");
}

#[tokio::test]
async fn test_user_photos_lists_only_own() {
    let app = setup_app();
    let ana = register(&app, "ana@example.com").await;
    let luis = register(&app, "luis@example.com").await;
    let anas = create_photo(&app, &ana).await;
    create_photo(&app, &luis).await;

    let (status, mine) = send(&app, get_request("/api/user/photos", Some(&ana))).await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], anas["id"]);
}

#[tokio::test]
async fn test_profile_update_accepts_empty_name() {
    let app = setup_app();

    // Facebook accounts without a provider name start with an empty name
    let (status, json) = send(
        &app,
        json_request("POST", "/api/auth/facebook", None, json!({"accessToken": "nameless-token"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = json["token"].as_str().unwrap().to_string();

    // The profile form always sends every field
    let (status, json) = send(
        &app,
        json_request(
            "PUT",
            "/api/user",
            Some(&token),
            json!({"name": "", "description": "d", "location": "Tula", "profilePicture": null}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "");
    assert_eq!(json["description"], "d");
    assert_eq!(json["location"], "Tula");
}

#[tokio::test]
async fn test_create_photo_does_not_reread_stored_photo() {
    let app = setup_app_with(Arc::new(FailingReads(InMemoryPhotoRepository::new())));
    let token = register(&app, "ana@example.com").await;

    let photo = create_photo(&app, &token).await;
    assert_eq!(photo["description"], "sunset");
    assert_eq!(photo["owner"]["name"], "ana");

    let (_, feed) = send(&app, get_request("/api/photos", Some(&token))).await;
    assert_eq!(feed[0]["id"], photo["id"]);
}
