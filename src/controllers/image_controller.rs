use axum::extract::Multipart;
use serde::Serialize;

use crate::controllers::car_controller::read_file_field;
use crate::dto::ApiResponse;
use crate::models::auth::{AuthenticatedUser, Permission};
use crate::services::ImageUploader;
use crate::utils::errors::AppResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub image_url: String,
}

pub struct ImageController {
    uploader: ImageUploader,
}

impl ImageController {
    pub fn new(uploader: ImageUploader) -> Self {
        Self { uploader }
    }

    pub async fn upload(
        &self,
        actor: &AuthenticatedUser,
        mut multipart: Multipart,
    ) -> AppResult<ApiResponse<ImageUploadResponse>> {
        actor.require(Permission::ManageImages)?;
        let (filename, content_type, bytes) = read_file_field(&mut multipart).await?;
        let image_url = self
            .uploader
            .upload(&filename, content_type.as_deref(), bytes)
            .await?;

        Ok(ApiResponse::success_with_message(
            ImageUploadResponse { image_url },
            "Image uploaded successfully",
        ))
    }
}
