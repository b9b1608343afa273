// src/db/photo_repository.rs
// DOCUMENTATION: Photo and comment database operations
// PURPOSE: Persistence contract used by the gallery service, backed by PostgreSQL

use crate::errors::GalleryError;
use crate::models::{Comment, Photo};
use async_trait::async_trait;
use sqlx::PgPool;

/// Persistence contract for photos and their comments
/// DOCUMENTATION: Every method is a single atomic statement. Comment lists are
/// always ordered by id, which is creation order.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn insert_photo(&self, filename: &str) -> Result<Photo, GalleryError>;

    /// Fails with PhotoNotFound if the referenced photo does not exist
    async fn insert_comment(&self, photo_id: i32, text: &str) -> Result<Comment, GalleryError>;

    async fn find_photo_by_id(&self, id: i32) -> Result<Option<Photo>, GalleryError>;

    async fn list_photos(&self) -> Result<Vec<Photo>, GalleryError>;

    async fn list_comments_for_photo(&self, photo_id: i32) -> Result<Vec<Comment>, GalleryError>;

    /// Comments for several photos in one round trip, ordered by (photo_id, id)
    async fn list_comments_for_photos(
        &self,
        photo_ids: &[i32],
    ) -> Result<Vec<Comment>, GalleryError>;
}

/// PostgreSQL implementation of PhotoStore
#[derive(Clone)]
pub struct PgPhotoStore {
    pool: PgPool,
}

impl PgPhotoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Postgres SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[async_trait]
impl PhotoStore for PgPhotoStore {
    async fn insert_photo(&self, filename: &str) -> Result<Photo, GalleryError> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (filename)
            VALUES ($1)
            RETURNING id, filename, created_at, updated_at
            "#,
        )
        .bind(filename)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create photo: {}", e);
            GalleryError::PersistenceFailure(format!("Create photo failed: {}", e))
        })?;

        Ok(photo)
    }

    async fn insert_comment(&self, photo_id: i32, text: &str) -> Result<Comment, GalleryError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (photo_id, text)
            VALUES ($1, $2)
            RETURNING id, photo_id, text, created_at, updated_at
            "#,
        )
        .bind(photo_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                    return GalleryError::PhotoNotFound(photo_id);
                }
            }
            log::error!("Failed to create comment for photo {}: {}", photo_id, e);
            GalleryError::PersistenceFailure(format!("Create comment failed: {}", e))
        })?;

        Ok(comment)
    }

    async fn find_photo_by_id(&self, id: i32) -> Result<Option<Photo>, GalleryError> {
        sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, filename, created_at, updated_at
            FROM photos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch photo {}: {}", id, e);
            GalleryError::PersistenceFailure(format!("Fetch photo failed: {}", e))
        })
    }

    async fn list_photos(&self) -> Result<Vec<Photo>, GalleryError> {
        sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, filename, created_at, updated_at
            FROM photos
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list photos: {}", e);
            GalleryError::PersistenceFailure(format!("List photos failed: {}", e))
        })
    }

    async fn list_comments_for_photo(&self, photo_id: i32) -> Result<Vec<Comment>, GalleryError> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, photo_id, text, created_at, updated_at
            FROM comments
            WHERE photo_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(photo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch comments for photo {}: {}", photo_id, e);
            GalleryError::PersistenceFailure(format!("Fetch comments failed: {}", e))
        })
    }

    async fn list_comments_for_photos(
        &self,
        photo_ids: &[i32],
    ) -> Result<Vec<Comment>, GalleryError> {
        if photo_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, photo_id, text, created_at, updated_at
            FROM comments
            WHERE photo_id = ANY($1)
            ORDER BY photo_id ASC, id ASC
            "#,
        )
        .bind(photo_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch comments for {} photos: {}", photo_ids.len(), e);
            GalleryError::PersistenceFailure(format!("Fetch comments failed: {}", e))
        })
    }
}
