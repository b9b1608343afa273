// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: One variant per failure category a caller can observe.
/// Variants carrying a String hold the internal detail, which is logged but
/// never written to the response body.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed or oversized multipart upload
    #[error("Invalid file upload: {0}")]
    InvalidUpload(String),

    #[error("Photo not found with id: {0}")]
    PhotoNotFound(i32),

    #[error("Media upload failed: {0}")]
    UploadFailure(String),

    #[error("Database error: {0}")]
    PersistenceFailure(String),

    /// Store failure while creating a comment
    #[error("Comment creation failed: {0}")]
    CommentFailure(String),

    /// Store failure while reading the photo listing
    #[error("Photo listing failed: {0}")]
    ListFailure(String),
}

impl GalleryError {
    /// Re-tag a persistence failure raised while creating a comment
    pub fn in_comment_context(self) -> Self {
        match self {
            GalleryError::PersistenceFailure(detail) => GalleryError::CommentFailure(detail),
            other => other,
        }
    }

    /// Re-tag a persistence failure raised while listing photos
    pub fn in_listing_context(self) -> Self {
        match self {
            GalleryError::PersistenceFailure(detail) => GalleryError::ListFailure(detail),
            other => other,
        }
    }
}

/// Convert GalleryError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and public bodies
impl ResponseError for GalleryError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }

        match self {
            GalleryError::MissingFile => {
                HttpResponse::build(status).json(json!({ "message": "No file uploaded" }))
            }
            GalleryError::InvalidInput(reason) => {
                HttpResponse::build(status).json(json!({ "error": reason }))
            }
            GalleryError::InvalidUpload(detail) => {
                log::warn!("Rejected upload: {}", detail);
                HttpResponse::build(status).json(json!({ "message": "Invalid file upload" }))
            }
            GalleryError::PhotoNotFound(_) => HttpResponse::build(status)
                .content_type("text/plain; charset=utf-8")
                .body("Photo not found"),
            GalleryError::UploadFailure(_) | GalleryError::PersistenceFailure(_) => {
                HttpResponse::build(status).json(json!({ "message": "Server error" }))
            }
            GalleryError::CommentFailure(_) => {
                HttpResponse::build(status).json(json!({ "error": "Failed to create comment." }))
            }
            GalleryError::ListFailure(_) => {
                HttpResponse::build(status).json(json!({ "error": "Failed to fetch photos." }))
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GalleryError::MissingFile => StatusCode::BAD_REQUEST,
            GalleryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GalleryError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            GalleryError::PhotoNotFound(_) => StatusCode::NOT_FOUND,
            GalleryError::UploadFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GalleryError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GalleryError::CommentFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GalleryError::ListFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
