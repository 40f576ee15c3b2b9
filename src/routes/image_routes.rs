use axum::{
    extract::{Multipart, State},
    routing::post,
    Extension, Json, Router,
};

use crate::controllers::image_controller::{ImageController, ImageUploadResponse};
use crate::dto::ApiResponse;
use crate::models::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_image_router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}

async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImageUploadResponse>>, AppError> {
    let controller = ImageController::new(state.images.clone());
    Ok(Json(controller.upload(&user, multipart).await?))
}
