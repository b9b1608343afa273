// src/handlers/photos.rs
// DOCUMENTATION: HTTP handlers for photo operations
// PURPOSE: Stage multipart uploads, call the gallery service, return responses

use crate::config::UploadConfig;
use crate::db::PhotoStore;
use crate::errors::GalleryError;
use crate::models::UploadResponse;
use crate::services::{GalleryService, MediaStorage};
use actix_multipart::{Field, Multipart};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Multipart field carrying the image
pub const PHOTO_FIELD: &str = "photo";

/// POST /upload
/// Stage the `photo` field to disk, push it to the media host, record it
pub async fn upload_photo(
    store: web::Data<dyn PhotoStore>,
    media: web::Data<dyn MediaStorage>,
    uploads: web::Data<UploadConfig>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<impl Responder, GalleryError> {
    let staged = stage_photo(&req, payload, uploads.get_ref()).await?;

    let photo =
        GalleryService::create_photo(store.get_ref(), media.get_ref(), staged.as_deref()).await?;

    Ok(HttpResponse::Ok().json(UploadResponse { data: photo }))
}

/// GET /
/// Every photo with its comments
pub async fn list_photos(
    store: web::Data<dyn PhotoStore>,
) -> Result<impl Responder, GalleryError> {
    let photos = GalleryService::list_photos_with_comments(store.get_ref())
        .await
        .map_err(GalleryError::in_listing_context)?;

    Ok(HttpResponse::Ok().json(photos))
}

/// Write the first `photo` file field under the upload dir
/// DOCUMENTATION: Returns Ok(None) when the request is not multipart or has no
/// such field. Other fields are drained and ignored.
async fn stage_photo(
    req: &HttpRequest,
    payload: web::Payload,
    uploads: &UploadConfig,
) -> Result<Option<PathBuf>, GalleryError> {
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        return Ok(None);
    }

    let mut multipart = Multipart::new(req.headers(), payload);
    let mut staged: Option<PathBuf> = None;

    if let Err(e) = read_parts(&mut multipart, uploads, &mut staged).await {
        if let Some(path) = staged.take() {
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                log::warn!("Could not remove staged file {}: {}", path.display(), remove_err);
            }
        }
        return Err(e);
    }

    Ok(staged)
}

/// Walk every part; `staged` is set before the photo is written so the
/// caller can remove it whatever fails afterwards
async fn read_parts(
    multipart: &mut Multipart,
    uploads: &UploadConfig,
    staged: &mut Option<PathBuf>,
) -> Result<(), GalleryError> {
    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(malformed)?;

        let disposition = field.content_disposition();
        let original_name = disposition.get_filename().map(str::to_owned);
        let is_photo = disposition.get_name() == Some(PHOTO_FIELD);

        match original_name {
            Some(name) if is_photo && staged.is_none() => {
                tokio::fs::create_dir_all(&uploads.dir).await.map_err(|e| {
                    log::error!("Failed to create upload dir {}: {}", uploads.dir.display(), e);
                    GalleryError::UploadFailure(format!("Create upload dir failed: {}", e))
                })?;

                let path = uploads.dir.join(staged_name(&name));
                *staged = Some(path.clone());
                write_field(&mut field, &path, uploads.max_bytes).await?;
                log::debug!("Staged upload {} as {}", name, path.display());
            }
            _ => drain_field(&mut field).await?,
        }
    }

    Ok(())
}

fn malformed(err: actix_multipart::MultipartError) -> GalleryError {
    GalleryError::InvalidUpload(format!("Malformed multipart body: {}", err))
}

async fn write_field(field: &mut Field, path: &Path, max_bytes: usize) -> Result<(), GalleryError> {
    let mut file = tokio::fs::File::create(path).await.map_err(|e| {
        log::error!("Failed to create staged file {}: {}", path.display(), e);
        GalleryError::UploadFailure(format!("Create staged file failed: {}", e))
    })?;

    let mut written = 0usize;
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed)?;

        written += chunk.len();
        if written > max_bytes {
            return Err(GalleryError::InvalidUpload(format!(
                "File exceeds the {} byte upload limit",
                max_bytes
            )));
        }

        file.write_all(&chunk).await.map_err(|e| {
            log::error!("Failed to write staged file {}: {}", path.display(), e);
            GalleryError::UploadFailure(format!("Write staged file failed: {}", e))
        })?;
    }

    file.flush()
        .await
        .map_err(|e| GalleryError::UploadFailure(format!("Flush staged file failed: {}", e)))
}

async fn drain_field(field: &mut Field) -> Result<(), GalleryError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(malformed)?;
    }
    Ok(())
}

/// Random name that keeps a short alphanumeric extension from the client's filename
fn staged_name(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}{}", Uuid::new_v4(), extension)
}

/// Configuration for photo routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload_photo))
        .route("/", web::get().to(list_photos));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryPhotoStore, StubMediaStorage};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    const BOUNDARY: &str = "photoboardboundary";

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                    name, filename
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn upload_request(body: String) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/upload")
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    struct Fixture {
        store: Arc<MemoryPhotoStore>,
        media: Arc<StubMediaStorage>,
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new(media: StubMediaStorage) -> Self {
            Self {
                store: Arc::new(MemoryPhotoStore::new()),
                media: Arc::new(media),
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn app(
            &self,
            max_bytes: usize,
        ) -> App<
            impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            >,
        > {
            let store: Arc<dyn PhotoStore> = self.store.clone();
            let media: Arc<dyn MediaStorage> = self.media.clone();
            App::new()
                .app_data(web::Data::from(store))
                .app_data(web::Data::from(media))
                .app_data(web::Data::new(UploadConfig {
                    dir: self.dir.path().join("uploads"),
                    max_bytes,
                }))
                .configure(config)
        }

        fn staged_files(&self) -> usize {
            std::fs::read_dir(self.dir.path().join("uploads"))
                .map(|entries| entries.count())
                .unwrap_or(0)
        }
    }

    #[actix_rt::test]
    async fn test_upload_creates_photo() {
        let fixture = Fixture::new(StubMediaStorage::returning("https://cdn.example/a.jpg"));
        let app = test::init_service(fixture.app(1024)).await;

        let req = upload_request(multipart_body(&[("photo", Some("a.JPG"), "jpegbytes")]))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["id"], json!(1));
        assert_eq!(body["data"]["filename"], json!("https://cdn.example/a.jpg"));
        assert_eq!(fixture.media.calls(), 1);
        assert_eq!(fixture.staged_files(), 1);
    }

    #[actix_rt::test]
    async fn test_upload_without_file() {
        let fixture = Fixture::new(StubMediaStorage::returning("https://cdn.example/a.jpg"));
        let app = test::init_service(fixture.app(1024)).await;

        let req = upload_request(multipart_body(&[("caption", None, "hello")])).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "No file uploaded" }));
        assert_eq!(fixture.media.calls(), 0);
    }

    #[actix_rt::test]
    async fn test_upload_non_multipart_request() {
        let fixture = Fixture::new(StubMediaStorage::returning("https://cdn.example/a.jpg"));
        let app = test::init_service(fixture.app(1024)).await;

        let req = test::TestRequest::post()
            .uri("/upload")
            .set_json(json!({ "photo": "a.jpg" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "No file uploaded" }));
        assert_eq!(fixture.store.photo_count().await, 0);
    }

    #[actix_rt::test]
    async fn test_upload_gateway_failure() {
        let fixture = Fixture::new(StubMediaStorage::failing());
        let app = test::init_service(fixture.app(1024)).await;

        let req = upload_request(multipart_body(&[("photo", Some("a.jpg"), "jpegbytes")]))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Server error" }));
        assert_eq!(fixture.store.photo_count().await, 0);
        assert_eq!(fixture.staged_files(), 0);
    }

    #[actix_rt::test]
    async fn test_upload_too_large() {
        let fixture = Fixture::new(StubMediaStorage::returning("https://cdn.example/a.jpg"));
        let app = test::init_service(fixture.app(4)).await;

        let req = upload_request(multipart_body(&[("photo", Some("a.jpg"), "jpegbytes")]))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Invalid file upload" }));
        assert_eq!(fixture.media.calls(), 0);
        assert_eq!(fixture.staged_files(), 0);
    }

    #[actix_rt::test]
    async fn test_upload_truncated_after_photo_cleans_up() {
        let fixture = Fixture::new(StubMediaStorage::returning("https://cdn.example/a.jpg"));
        let app = test::init_service(fixture.app(1024)).await;

        // Complete photo part, then a caption part cut off before its boundary
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"a.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\njpegbytes\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nhel",
            b = BOUNDARY
        );
        let resp = test::call_service(&app, upload_request(body).to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Invalid file upload" }));
        assert_eq!(fixture.media.calls(), 0);
        assert_eq!(fixture.store.photo_count().await, 0);
        assert_eq!(fixture.staged_files(), 0);
    }

    #[actix_rt::test]
    async fn test_list_photos_with_comments() {
        let fixture = Fixture::new(StubMediaStorage::returning("https://cdn.example/a.jpg"));
        fixture.store.insert_photo("https://cdn.example/a.jpg").await.unwrap();
        fixture.store.insert_comment(1, "nice").await.unwrap();
        let app = test::init_service(fixture.app(1024)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body[0]["id"], json!(1));
        assert_eq!(body[0]["Comments"][0]["text"], json!("nice"));
        assert_eq!(body[0]["Comments"][0]["photoId"], json!(1));
    }

    #[actix_rt::test]
    async fn test_list_photos_store_failure() {
        let fixture = Fixture::new(StubMediaStorage::returning("https://cdn.example/a.jpg"));
        fixture.store.fail_all();
        let app = test::init_service(fixture.app(1024)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Failed to fetch photos." }));
    }

    #[::core::prelude::v1::test]
    fn test_staged_name_keeps_safe_extension() {
        assert!(staged_name("cat.JPEG").ends_with(".jpeg"));
        assert!(!staged_name("archive.tar/../x").contains(".."));
        assert!(!staged_name("noext").contains('.'));
        assert!(!staged_name("weird.j$g").contains('$'));
    }
}
