// src/testing.rs
// DOCUMENTATION: In-memory test doubles for the store and the media host

use crate::db::PhotoStore;
use crate::errors::GalleryError;
use crate::models::{Comment, Photo};
use crate::services::MediaStorage;
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    photos: Vec<Photo>,
    comments: Vec<Comment>,
}

/// Vec-backed store with serial ids starting at 1
#[derive(Default)]
pub struct MemoryPhotoStore {
    tables: RwLock<Tables>,
    failing: AtomicBool,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with PersistenceFailure
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.read().await.comments.len()
    }

    pub async fn photo_count(&self) -> usize {
        self.tables.read().await.photos.len()
    }

    fn check(&self) -> Result<(), GalleryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GalleryError::PersistenceFailure("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn insert_photo(&self, filename: &str) -> Result<Photo, GalleryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let photo = Photo {
            id: tables.photos.len() as i32 + 1,
            filename: filename.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.photos.push(photo.clone());
        Ok(photo)
    }

    async fn insert_comment(&self, photo_id: i32, text: &str) -> Result<Comment, GalleryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if !tables.photos.iter().any(|p| p.id == photo_id) {
            return Err(GalleryError::PhotoNotFound(photo_id));
        }
        let now = Utc::now();
        let comment = Comment {
            id: tables.comments.len() as i32 + 1,
            photo_id,
            text: text.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_photo_by_id(&self, id: i32) -> Result<Option<Photo>, GalleryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.photos.iter().find(|p| p.id == id).cloned())
    }

    async fn list_photos(&self) -> Result<Vec<Photo>, GalleryError> {
        self.check()?;
        Ok(self.tables.read().await.photos.clone())
    }

    async fn list_comments_for_photo(&self, photo_id: i32) -> Result<Vec<Comment>, GalleryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.photo_id == photo_id)
            .cloned()
            .collect())
    }

    async fn list_comments_for_photos(
        &self,
        photo_ids: &[i32],
    ) -> Result<Vec<Comment>, GalleryError> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| photo_ids.contains(&c.photo_id))
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.photo_id, c.id));
        Ok(comments)
    }
}

/// Media host double: returns a fixed URL, or fails when built with `failing()`
pub struct StubMediaStorage {
    url: Option<String>,
    calls: AtomicUsize,
}

impl StubMediaStorage {
    pub fn returning(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            url: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStorage for StubMediaStorage {
    async fn upload(&self, _local_path: &Path) -> Result<String, GalleryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.url
            .clone()
            .ok_or_else(|| GalleryError::UploadFailure("connection refused".to_string()))
    }
}
