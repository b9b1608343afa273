// src/services/media_storage.rs
// DOCUMENTATION: Media host client
// PURPOSE: Push staged uploads to Cloudinary and hand back their public URL

use crate::config::{CloudinaryConfig, SignatureAlgorithm};
use crate::errors::GalleryError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

/// Durable storage for uploaded media
/// DOCUMENTATION: Accepts a local file and returns a public URL for it.
/// Implementations do not retry.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(&self, local_path: &Path) -> Result<String, GalleryError>;
}

/// Cloudinary upload API client
/// DOCUMENTATION: Uses signed uploads. The digest follows
/// `CloudinaryConfig::signature_algorithm`, SHA-1 by default like the account setting.
pub struct CloudinaryClient {
    /// HTTP client for making requests
    client: Client,
    config: CloudinaryConfig,
}

/// Successful upload response (only the fields we read)
#[derive(Debug, Deserialize)]
struct UploadResult {
    secure_url: Option<String>,
}

/// Error envelope returned by Cloudinary on 4xx/5xx
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryClient {
    /// Create a new client from account settings
    pub fn new(config: CloudinaryConfig) -> Result<Self, GalleryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GalleryError::UploadFailure(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Parameters covered by the signature, excluding file and api_key
    fn signed_params(&self, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("timestamp", timestamp.to_string())];
        if let Some(folder) = &self.config.folder {
            params.push(("folder", folder.clone()));
        }
        params
    }

    /// Sign upload parameters
    /// DOCUMENTATION: Sorted `key=value` pairs joined by `&`, secret appended,
    /// hashed with the account's algorithm, lowercase hex.
    pub fn sign(
        params: &[(&str, String)],
        api_secret: &str,
        algorithm: SignatureAlgorithm,
    ) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let payload = format!("{}{}", to_sign, api_secret);
        match algorithm {
            SignatureAlgorithm::Sha1 => format!("{:x}", Sha1::digest(payload.as_bytes())),
            SignatureAlgorithm::Sha256 => format!("{:x}", Sha256::digest(payload.as_bytes())),
        }
    }
}

#[async_trait]
impl MediaStorage for CloudinaryClient {
    async fn upload(&self, local_path: &Path) -> Result<String, GalleryError> {
        if !self.config.is_configured() {
            return Err(GalleryError::UploadFailure(
                "Cloudinary credentials not configured".to_string(),
            ));
        }

        let bytes = tokio::fs::read(local_path).await.map_err(|e| {
            log::error!("Failed to read staged file {}: {}", local_path.display(), e);
            GalleryError::UploadFailure(format!("Read staged file failed: {}", e))
        })?;

        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let params = self.signed_params(chrono::Utc::now().timestamp());
        let signature = Self::sign(
            &params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        );

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        log::debug!("Uploading {} to Cloudinary", local_path.display());

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                log::error!("Cloudinary upload request failed: {}", e);
                GalleryError::UploadFailure(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| "no error body".to_string());
            log::error!("Cloudinary rejected upload ({}): {}", status, message);
            return Err(GalleryError::UploadFailure(format!(
                "Upload status {}: {}",
                status, message
            )));
        }

        let result: UploadResult = response
            .json()
            .await
            .map_err(|e| GalleryError::UploadFailure(format!("Parse error: {}", e)))?;

        match result.secure_url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(GalleryError::UploadFailure(
                "Upload response had no secure_url".to_string(),
            )),
        }
    }
}
