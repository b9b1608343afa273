// src/services/gallery_service.rs
// DOCUMENTATION: Business logic for photos and comments
// PURPOSE: Intermediary between handlers, the media host and the photo store

use crate::db::PhotoStore;
use crate::errors::GalleryError;
use crate::models::{Comment, CreateCommentRequest, Photo, PhotoWithComments};
use crate::services::MediaStorage;
use std::collections::HashMap;
use std::path::Path;

/// Stateless orchestration; every dependency is passed per call
pub struct GalleryService;

impl GalleryService {
    /// Upload a staged file and record it as a photo
    /// DOCUMENTATION: Upload first, persist second. When the media host rejects
    /// the file the staged copy is deleted; on success it stays on disk.
    pub async fn create_photo(
        store: &dyn PhotoStore,
        media: &dyn MediaStorage,
        staged_file: Option<&Path>,
    ) -> Result<Photo, GalleryError> {
        let staged_file = staged_file.ok_or(GalleryError::MissingFile)?;

        let url = match media.upload(staged_file).await {
            Ok(url) if !url.trim().is_empty() => url,
            Ok(_) => {
                discard_staged(staged_file).await;
                return Err(GalleryError::UploadFailure(
                    "Media host returned an empty URL".to_string(),
                ));
            }
            Err(e) => {
                discard_staged(staged_file).await;
                return Err(e);
            }
        };

        let photo = store.insert_photo(&url).await?;
        log::info!("Created photo {} -> {}", photo.id, photo.filename);
        Ok(photo)
    }

    /// Attach a comment to an existing photo
    pub async fn create_comment(
        store: &dyn PhotoStore,
        req: CreateCommentRequest,
    ) -> Result<Comment, GalleryError> {
        let new_comment = req.into_new_comment()?;

        if store.find_photo_by_id(new_comment.photo_id).await?.is_none() {
            return Err(GalleryError::PhotoNotFound(new_comment.photo_id));
        }

        store
            .insert_comment(new_comment.photo_id, &new_comment.text)
            .await
    }

    /// All photos with their comments, both in creation order
    pub async fn list_photos_with_comments(
        store: &dyn PhotoStore,
    ) -> Result<Vec<PhotoWithComments>, GalleryError> {
        let photos = store.list_photos().await?;
        let ids: Vec<i32> = photos.iter().map(|p| p.id).collect();
        let comments = store.list_comments_for_photos(&ids).await?;

        let mut by_photo: HashMap<i32, Vec<Comment>> = HashMap::new();
        for comment in comments {
            by_photo.entry(comment.photo_id).or_default().push(comment);
        }

        Ok(photos
            .into_iter()
            .map(|photo| {
                let comments = by_photo.remove(&photo.id).unwrap_or_default();
                PhotoWithComments { photo, comments }
            })
            .collect())
    }
}

async fn discard_staged(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        log::warn!("Could not remove staged file {}: {}", path.display(), e);
    }
}
