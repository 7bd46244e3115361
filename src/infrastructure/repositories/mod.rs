// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory_photo_repository;
pub mod in_memory_user_repository;
pub mod postgres_photo_repository;
pub mod postgres_user_repository;

pub use in_memory_photo_repository::InMemoryPhotoRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use postgres_photo_repository::PostgresPhotoRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domain::errors::RepositoryError;

/// Maps a sqlx failure, keeping unique violations distinguishable
fn database_error(context: &str, error: sqlx::Error) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(format!("{}: {}", context, db.message()))
        }
        _ => RepositoryError::Database(format!("{}: {}", context, error)),
    }
}
