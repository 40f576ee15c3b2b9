use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::dto::auth_dto::{
    CredentialsRequest, ForgotPasswordRequest, LoginWithTotpRequest, ResetPasswordRequest,
    SignUpRequest, SignUpResponse, TokenResponse, TotpSetupResponse, TotpVerifyByEmailRequest,
};
use crate::dto::ApiResponse;
use crate::services::{AuthService, SignInOutcome};
use crate::utils::errors::AppResult;

/// Endpoints públicos de `/api/auth`
pub struct AuthController {
    pool: PgPool,
    auth: AuthService,
}

impl AuthController {
    pub fn new(pool: PgPool, auth: AuthService) -> Self {
        Self { pool, auth }
    }

    pub async fn signup(&self, request: SignUpRequest) -> AppResult<ApiResponse<SignUpResponse>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let response = self.auth.signup(&mut *tx, request).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(
            response,
            "User registered successfully. Scan the QR code to set up TOTP",
        ))
    }

    pub async fn signin(&self, request: CredentialsRequest) -> AppResult<ApiResponse<SignInOutcome>> {
        request.validate()?;
        let mut conn = self.pool.acquire().await?;
        let outcome = self
            .auth
            .signin(&mut *conn, &request.email, &request.password)
            .await?;

        let message = match outcome {
            SignInOutcome::Authenticated(_) => "Login successful",
            SignInOutcome::TotpRequired(_) => "TOTP_REQUIRED",
        };
        Ok(ApiResponse::success_with_message(outcome, message))
    }

    pub async fn signin_totp(&self, request: LoginWithTotpRequest) -> AppResult<ApiResponse<TokenResponse>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let token = self
            .auth
            .signin_with_totp(&mut *tx, &request.email, &request.password, &request.code)
            .await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(token, "Login successful"))
    }

    pub async fn totp_setup(&self, request: CredentialsRequest) -> AppResult<ApiResponse<TotpSetupResponse>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let material = self
            .auth
            .public_totp_setup(&mut *tx, &request.email, &request.password)
            .await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(material, "TOTP setup generated"))
    }

    pub async fn totp_verify(&self, request: TotpVerifyByEmailRequest) -> AppResult<ApiResponse<()>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        self.auth
            .public_totp_verify(&mut *tx, &request.email, &request.code)
            .await?;
        tx.commit().await?;

        Ok(ApiResponse::message("TOTP verified successfully"))
    }

    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> AppResult<ApiResponse<()>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        self.auth
            .forgot_password(&mut *tx, &request.email, Utc::now())
            .await?;
        tx.commit().await?;

        Ok(ApiResponse::message(
            "If the email exists, a password reset link has been sent",
        ))
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<ApiResponse<()>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        self.auth
            .reset_password(&mut *tx, &request.token, &request.new_password, Utc::now())
            .await?;
        tx.commit().await?;

        Ok(ApiResponse::message("Password has been reset successfully"))
    }
}
