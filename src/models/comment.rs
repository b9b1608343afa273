// src/models/comment.rs
// DOCUMENTATION: Comment records and the request used to create them
// PURPOSE: Shape and validate comment input before it reaches the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use crate::errors::GalleryError;

/// Message returned for any malformed comment request
pub const COMMENT_REQUIRED_FIELDS: &str = "Photo ID and text are required.";

/// Text comment attached to a photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub photo_id: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for POST /comments
/// DOCUMENTATION: photoId is kept as raw JSON so both `1` and `"1"` are accepted;
/// anything else is rejected as invalid input rather than a decode error.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(required)]
    pub photo_id: Option<Value>,

    #[validate(required, length(min = 1))]
    pub text: Option<String>,
}

/// A comment request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub photo_id: i32,
    pub text: String,
}

impl CreateCommentRequest {
    /// Validate the request and extract a well-formed photo id and text
    pub fn into_new_comment(self) -> Result<NewComment, GalleryError> {
        if let Err(e) = self.validate() {
            log::debug!("Rejected comment request: {}", e);
            return Err(GalleryError::InvalidInput(COMMENT_REQUIRED_FIELDS.to_string()));
        }

        let photo_id = self
            .photo_id
            .as_ref()
            .and_then(parse_photo_id)
            .ok_or_else(|| GalleryError::InvalidInput(COMMENT_REQUIRED_FIELDS.to_string()))?;

        let text = self.text.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GalleryError::InvalidInput(COMMENT_REQUIRED_FIELDS.to_string()));
        }

        Ok(NewComment { photo_id, text })
    }
}

/// Positive integer ids only, given as a JSON number or numeric string
fn parse_photo_id(raw: &Value) -> Option<i32> {
    let id = match raw {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    i32::try_from(id).ok().filter(|id| *id > 0)
}
