//! Subida de imágenes a Cloudinary (upload firmado) con almacenamiento local
//! como alternativa cuando no hay credenciales.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::config::environment::CloudinaryConfig;
use crate::services::file_storage_service::FileStorage;
use crate::utils::errors::{AppError, AppResult};

const UPLOAD_FOLDER: &str = "cars";

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorMessage,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorMessage {
    message: String,
}

/// Firma de Cloudinary: SHA-1 hex de los parámetros ordenados + api_secret
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct ImageUploader {
    cloudinary: Option<CloudinaryConfig>,
    local: FileStorage,
    client: reqwest::Client,
}

impl ImageUploader {
    pub fn new(cloudinary: Option<CloudinaryConfig>, local: FileStorage) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            cloudinary,
            local,
            client,
        })
    }

    pub fn local(&self) -> &FileStorage {
        &self.local
    }

    /// Sube la imagen y devuelve su URL pública
    pub async fn upload(&self, original_name: &str, content_type: Option<&str>, bytes: Vec<u8>) -> AppResult<String> {
        match &self.cloudinary {
            Some(config) => self.upload_to_cloudinary(config, original_name, content_type, bytes).await,
            None => self.local.store(original_name, &bytes).await,
        }
    }

    async fn upload_to_cloudinary(
        &self,
        config: &CloudinaryConfig,
        original_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> AppResult<String> {
        FileStorage::allowed_extension(original_name)?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", UPLOAD_FOLDER.to_string()), ("timestamp", timestamp.clone())],
            &config.api_secret,
        );

        let mut part = Part::bytes(bytes).file_name(original_name.to_string());
        if let Some(mime) = content_type {
            part = part
                .mime_str(mime)
                .map_err(|e| AppError::BadRequest(format!("Invalid content type: {}", e)))?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", UPLOAD_FOLDER)
            .text("signature", signature);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            config.cloud_name
        );
        tracing::debug!(cloud = %config.cloud_name, "☁️ Subiendo imagen a Cloudinary");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Cloudinary request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<CloudinaryErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.to_string());
            tracing::error!(%status, detail = %detail, "❌ Cloudinary rechazó la subida");
            return Err(AppError::ExternalApi(format!("Cloudinary error: {}", detail)));
        }

        let body: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Invalid Cloudinary response: {}", e)))?;

        tracing::info!(url = %body.secure_url, "☁️ Imagen subida a Cloudinary");
        Ok(body.secure_url)
    }
}
