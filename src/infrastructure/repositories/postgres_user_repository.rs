use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::database_error;
use crate::domain::errors::RepositoryError;
use crate::domain::repositories::UserRepository;
use crate::domain::user::{Email, NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str = "id, email, password_hash, name, description, location, \
                            profile_picture_url, facebook_id, created_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    name: String,
    description: String,
    location: String,
    profile_picture_url: Option<String>,
    facebook_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(&r.email)
            .map_err(|e| RepositoryError::Corrupt(format!("user {}: {}", r.id, e)))?;

        Ok(User {
            id: r.id,
            email,
            password_hash: r.password_hash,
            name: r.name,
            description: r.description,
            location: r.location,
            profile_picture_url: r.profile_picture_url,
            facebook_id: r.facebook_id,
            created_at: r.created_at,
        })
    }
}

/// PostgreSQL implementation of UserRepository
///
/// Email uniqueness is enforced by the `users_email_key` index, so two
/// racing registrations for the same address cannot both succeed.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let user = user.into_user();

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                id, email, password_hash, name, description, location,
                profile_picture_url, facebook_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.description)
        .bind(&user.location)
        .bind(&user.profile_picture_url)
        .bind(&user.facebook_id)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("Failed to create user", e))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to find user by id", e))?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to find user by email", e))?
        .map(User::try_from)
        .transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to find users", e))?
        .into_iter()
        .map(User::try_from)
        .collect()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                profile_picture_url = COALESCE($5, profile_picture_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.location)
        .bind(update.profile_picture_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to update profile", e))?
        .map(User::try_from)
        .transpose()
    }

    async fn link_facebook(&self, id: Uuid, facebook_id: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE users
            SET facebook_id = $2, updated_at = NOW()
            WHERE id = $1 AND facebook_id IS NULL
            "#,
        )
        .bind(id)
        .bind(facebook_id)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to link facebook id", e))?;

        Ok(())
    }
}
