use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{
    CredentialsRequest, ForgotPasswordRequest, LoginWithTotpRequest, ResetPasswordRequest,
    SignUpRequest, SignUpResponse, TokenResponse, TotpSetupResponse, TotpVerifyByEmailRequest,
};
use crate::dto::ApiResponse;
use crate::services::SignInOutcome;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas públicas de autenticación
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signin-totp", post(signin_totp))
        .route("/totp/setup", post(totp_setup))
        .route("/totp/verify", post(totp_verify))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

fn controller(state: &AppState) -> AuthController {
    AuthController::new(state.pool.clone(), state.auth.clone())
}

async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SignUpResponse>>), AppError> {
    let response = controller(&state).signup(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn signin(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<SignInOutcome>>, AppError> {
    Ok(Json(controller(&state).signin(request).await?))
}

async fn signin_totp(
    State(state): State<AppState>,
    Json(request): Json<LoginWithTotpRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, AppError> {
    Ok(Json(controller(&state).signin_totp(request).await?))
}

async fn totp_setup(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<TotpSetupResponse>>, AppError> {
    Ok(Json(controller(&state).totp_setup(request).await?))
}

async fn totp_verify(
    State(state): State<AppState>,
    Json(request): Json<TotpVerifyByEmailRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).totp_verify(request).await?))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).forgot_password(request).await?))
}

async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).reset_password(request).await?))
}
