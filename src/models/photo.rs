// src/models/photo.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Comment;

/// Photo hosted on the media provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i32,
    /// Public URL returned by the media host
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a successful upload: `{ "data": Photo }`
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub data: Photo,
}

/// Listing entry: the photo's own fields plus its comments under `Comments`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoWithComments {
    #[serde(flatten)]
    pub photo: Photo,
    #[serde(rename = "Comments")]
    pub comments: Vec<Comment>,
}
