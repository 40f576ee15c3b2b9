//! Almacenamiento local de imágenes de coches
//!
//! Los ficheros se guardan en `UPLOAD_DIR` con un nombre `<uuid>.<ext>` y se
//! sirven de vuelta bajo `/cars/`.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::file_extension;

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
pub const PUBLIC_PREFIX: &str = "/cars/";

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extensión permitida del nombre original, o `BadRequest`
    pub fn allowed_extension(filename: &str) -> AppResult<String> {
        match file_extension(filename) {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
            _ => Err(AppError::BadRequest(format!(
                "Invalid file type. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))),
        }
    }

    /// Guarda el contenido y devuelve la URL pública `/cars/<uuid>.<ext>`
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        let ext = Self::allowed_extension(original_name)?;

        tokio::fs::create_dir_all(&self.root).await?;
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::write(self.root.join(&filename), bytes).await?;

        tracing::info!(file = %filename, size = bytes.len(), "🖼️ Imagen guardada");
        Ok(format!("{}{}", PUBLIC_PREFIX, filename))
    }
}
