use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::totp_controller::TotpController;
use crate::dto::auth_dto::{TotpCodeRequest, TotpSetupResponse, TotpStatusResponse};
use crate::dto::ApiResponse;
use crate::models::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_totp_router() -> Router<AppState> {
    Router::new()
        .route("/setup", post(setup))
        .route("/verify", post(verify))
        .route("/disable", post(disable))
        .route("/status", get(status))
}

fn controller(state: &AppState) -> TotpController {
    TotpController::new(state.pool.clone(), state.auth.totp().clone())
}

async fn setup(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<TotpSetupResponse>>, AppError> {
    Ok(Json(controller(&state).setup(&user).await?))
}

async fn verify(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<TotpCodeRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).verify(&user, request).await?))
}

async fn disable(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<TotpCodeRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).disable(&user, request).await?))
}

async fn status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<TotpStatusResponse>>, AppError> {
    Ok(Json(controller(&state).status(&user).await?))
}
