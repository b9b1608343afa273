// src/handlers/comments.rs
// DOCUMENTATION: HTTP handlers for comment operations
// PURPOSE: Parse comment requests and hand them to the gallery service

use crate::db::PhotoStore;
use crate::errors::GalleryError;
use crate::models::{CreateCommentRequest, COMMENT_REQUIRED_FIELDS};
use crate::services::GalleryService;
use actix_web::{web, HttpResponse, Responder};

/// POST /comments
/// Attach a comment to an existing photo
pub async fn create_comment(
    store: web::Data<dyn PhotoStore>,
    req: web::Json<CreateCommentRequest>,
) -> Result<impl Responder, GalleryError> {
    let comment = GalleryService::create_comment(store.get_ref(), req.into_inner())
        .await
        .map_err(GalleryError::in_comment_context)?;

    log::info!("Created comment {} on photo {}", comment.id, comment.photo_id);
    Ok(HttpResponse::Created().json(comment))
}

/// Undecodable JSON bodies get the same 400 as missing fields
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected comment body: {}", err);
        GalleryError::InvalidInput(COMMENT_REQUIRED_FIELDS.to_string()).into()
    })
}

/// Configuration for comment routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/comments")
            .app_data(json_config())
            .route(web::post().to(create_comment)),
    );
}
