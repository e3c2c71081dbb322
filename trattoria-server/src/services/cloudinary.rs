//! Cloudinary signed image upload
//!
//! Uploads go to `POST https://api.cloudinary.com/v1_1/{cloud}/image/upload`
//! signed with SHA-256 over the sorted parameters plus the API secret.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DEFAULT_FOLDER: &str = "trattoria";

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("folder", &self.folder)
            .finish()
    }
}

impl CloudinaryConfig {
    /// `None` unless cloud name, key and secret are all set
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            cloud_name: var("CLOUDINARY_CLOUD_NAME")?,
            api_key: var("CLOUDINARY_API_KEY")?,
            api_secret: var("CLOUDINARY_API_SECRET")?,
            folder: var("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
        })
    }
}

#[derive(Debug, Error)]
pub enum CloudinaryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cloudinary rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Result of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Hex SHA-256 of `k1=v1&k2=v2...` (keys sorted) followed by the secret
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha256::digest(format!("{to_sign}{api_secret}").as_bytes()))
}

#[derive(Clone, Debug)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, CloudinaryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, config })
    }

    /// Upload image bytes into the configured folder
    pub async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        mime: &str,
    ) -> Result<UploadedImage, CloudinaryError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let part = Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = format!("{API_BASE}/{}/image/upload", self.config.cloud_name);
        let response = self.http.post(url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), message = %message, "Cloudinary upload rejected");
            return Err(CloudinaryError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::info!(public_id = %uploaded.public_id, "Image uploaded to Cloudinary");
        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let expected = hex::encode(Sha256::digest(b"folder=menu&timestamp=1315060510abcd"));
        assert_eq!(
            sign(&[("timestamp", "1315060510"), ("folder", "menu")], "abcd"),
            expected
        );
    }

    #[test]
    fn empty_params_are_skipped() {
        assert_eq!(
            sign(&[("folder", ""), ("timestamp", "1")], "s"),
            sign(&[("timestamp", "1")], "s")
        );
    }

    #[test]
    fn debug_hides_secret() {
        let config = CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "very-secret".into(),
            folder: "trattoria".into(),
        };
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
