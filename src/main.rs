use std::path::PathBuf;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use fotoutc_api::api::{build_router, AppState};
use fotoutc_api::auth::jwt::TokenService;
use fotoutc_api::config::{AppConfig, BlobConfig, StorageConfig};
use fotoutc_api::domain::repositories::{PhotoRepository, UserRepository};
use fotoutc_api::domain::storage::BlobStore;
use fotoutc_api::infrastructure::blob::{LocalBlobStore, S3BlobStore};
use fotoutc_api::infrastructure::identity::FacebookIdentityProvider;
use fotoutc_api::infrastructure::repositories::{
    InMemoryPhotoRepository, InMemoryUserRepository, PostgresPhotoRepository,
    PostgresUserRepository,
};
use fotoutc_api::services::{AccountService, MediaService, PhotoService};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fotoutc_api=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let config = AppConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let (users, photos) = match &config.storage {
        StorageConfig::Postgres {
            url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect_lazy(url)?;

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database ready");

            let users: Arc<dyn UserRepository> =
                Arc::new(PostgresUserRepository::new(pool.clone()));
            let photos: Arc<dyn PhotoRepository> = Arc::new(PostgresPhotoRepository::new(pool));
            (users, photos)
        }
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
            let photos: Arc<dyn PhotoRepository> = Arc::new(InMemoryPhotoRepository::new());
            (users, photos)
        }
    };

    let (blobs, media_dir): (Arc<dyn BlobStore>, Option<PathBuf>) = match &config.blob {
        BlobConfig::S3(s3) => {
            tracing::info!(bucket = %s3.bucket, region = %s3.region, "Using S3 blob store");
            let store: Arc<dyn BlobStore> = Arc::new(S3BlobStore::new(s3.clone()));
            (store, None)
        }
        BlobConfig::Local { dir, public_url } => {
            tokio::fs::create_dir_all(dir).await?;
            tracing::info!(dir = %dir.display(), "Using local blob store");
            let store: Arc<dyn BlobStore> =
                Arc::new(LocalBlobStore::new(dir.clone(), public_url.clone()));
            (store, Some(dir.clone()))
        }
    };

    let tokens = TokenService::with_ttl(
        &config.jwt_secret,
        chrono::Duration::seconds(config.token_ttl_secs),
    );
    let identity = Arc::new(FacebookIdentityProvider::new(config.facebook_graph_url.clone()));
    let media = Arc::new(MediaService::new(blobs));

    let state = AppState {
        accounts: Arc::new(AccountService::new(
            users.clone(),
            identity,
            tokens.clone(),
            config.bcrypt_cost,
        )),
        photos: Arc::new(PhotoService::new(photos, users, media.clone())),
        media,
        tokens,
    };

    let app = build_router(state, config.max_upload_bytes, media_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
