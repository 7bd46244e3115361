use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::database_error;
use crate::domain::errors::RepositoryError;
use crate::domain::photo::{Comment, Photo};
use crate::domain::repositories::PhotoRepository;

const PHOTO_COLUMNS: &str =
    "id, image_url, description, location, owner_id, created_at, likes, comments";

#[derive(Debug, FromRow)]
struct PhotoRow {
    id: Uuid,
    image_url: String,
    description: String,
    location: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    likes: Vec<Uuid>,
    comments: Json<Vec<Comment>>,
}

impl From<PhotoRow> for Photo {
    fn from(r: PhotoRow) -> Self {
        Photo::from_persistence(
            r.id,
            r.image_url,
            r.description,
            r.location,
            r.owner_id,
            r.created_at,
            r.likes,
            r.comments.0,
        )
    }
}

/// PostgreSQL implementation of PhotoRepository
///
/// A photo is one row: likes live in a `UUID[]` column and comments in a
/// `JSONB` array. Both are only ever changed by a single `UPDATE`, which
/// takes the row lock and re-evaluates against the latest row version, so
/// concurrent toggles and appends never overwrite each other.
#[derive(Clone)]
pub struct PostgresPhotoRepository {
    pool: PgPool,
}

impl PostgresPhotoRepository {
    /// Creates a new PostgresPhotoRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoRepository for PostgresPhotoRepository {
    async fn insert(&self, photo: &Photo) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO photos (
                id, image_url, description, location, owner_id, created_at, likes, comments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(photo.id())
        .bind(photo.image_url())
        .bind(photo.description())
        .bind(photo.location())
        .bind(photo.owner_id())
        .bind(photo.created_at())
        .bind(photo.likes().to_vec())
        .bind(Json(photo.comments().to_vec()))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to insert photo", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Photo>, RepositoryError> {
        let row = sqlx::query_as::<_, PhotoRow>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to find photo by id", e))?;

        Ok(row.map(Photo::from))
    }

    async fn list_recent(&self) -> Result<Vec<Photo>, RepositoryError> {
        let rows = sqlx::query_as::<_, PhotoRow>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list photos", e))?;

        Ok(rows.into_iter().map(Photo::from).collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Photo>, RepositoryError> {
        let rows = sqlx::query_as::<_, PhotoRow>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list photos by owner", e))?;

        Ok(rows.into_iter().map(Photo::from).collect())
    }

    async fn toggle_like(
        &self,
        photo_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Vec<Uuid>>, RepositoryError> {
        let likes: Option<Vec<Uuid>> = sqlx::query_scalar(
            r#"
            UPDATE photos
            SET likes = CASE
                WHEN $2 = ANY(likes) THEN array_remove(likes, $2)
                ELSE array_append(likes, $2)
            END
            WHERE id = $1
            RETURNING likes
            "#,
        )
        .bind(photo_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to toggle like", e))?;

        Ok(likes)
    }

    async fn push_comment(
        &self,
        photo_id: Uuid,
        comment: &Comment,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE photos
            SET comments = comments || jsonb_build_array($2::jsonb)
            WHERE id = $1
            "#,
        )
        .bind(photo_id)
        .bind(Json(comment))
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to append comment", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn comments_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<(Uuid, Comment)>, RepositoryError> {
        let rows: Vec<(Uuid, Json<Comment>)> = sqlx::query_as(
            r#"
            SELECT p.id, c.value
            FROM photos p
            CROSS JOIN LATERAL jsonb_array_elements(p.comments) AS c(value)
            WHERE c.value ->> 'author_id' = $1
            "#,
        )
        .bind(author_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list comments by author", e))?;

        let mut comments: Vec<_> = rows
            .into_iter()
            .map(|(photo_id, comment)| (photo_id, comment.0))
            .collect();
        comments.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));

        Ok(comments)
    }
}
