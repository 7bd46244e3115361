use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::RepositoryError;
use crate::domain::user::{Email, NewUser, ProfileUpdate, User};

/// Repository trait for User records
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user
    ///
    /// Fails with `RepositoryError::Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// Find a user by (normalized) email address
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Find every user whose id is in `ids`; missing ids are skipped
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepositoryError>;

    /// Apply a partial profile update, returning the updated user
    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError>;

    /// Record the external provider id on an existing account
    async fn link_facebook(&self, id: Uuid, facebook_id: &str) -> Result<(), RepositoryError>;
}
