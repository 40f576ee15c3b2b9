use sqlx::PgPool;
use validator::Validate;

use crate::dto::auth_dto::{TotpCodeRequest, TotpSetupResponse, TotpStatusResponse};
use crate::dto::ApiResponse;
use crate::models::auth::AuthenticatedUser;
use crate::services::{user_service, TotpService};
use crate::utils::errors::AppResult;

/// Gestión del segundo factor del usuario autenticado
pub struct TotpController {
    pool: PgPool,
    totp: TotpService,
}

impl TotpController {
    pub fn new(pool: PgPool, totp: TotpService) -> Self {
        Self { pool, totp }
    }

    pub async fn setup(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<TotpSetupResponse>> {
        let mut tx = self.pool.begin().await?;
        let user = user_service::find_user(&mut *tx, actor.user_id).await?;
        let material = self.totp.setup(&mut *tx, &user).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(
            material,
            "Scan the QR code with your authenticator app",
        ))
    }

    pub async fn verify(&self, actor: &AuthenticatedUser, request: TotpCodeRequest) -> AppResult<ApiResponse<()>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let user = user_service::find_user(&mut *tx, actor.user_id).await?;
        self.totp.verify_enrollment(&mut *tx, &user, &request.code).await?;
        tx.commit().await?;

        Ok(ApiResponse::message("TOTP verified successfully"))
    }

    pub async fn disable(&self, actor: &AuthenticatedUser, request: TotpCodeRequest) -> AppResult<ApiResponse<()>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let user = user_service::find_user(&mut *tx, actor.user_id).await?;
        self.totp.disable(&mut *tx, &user, &request.code).await?;
        tx.commit().await?;

        Ok(ApiResponse::message("TOTP disabled successfully"))
    }

    pub async fn status(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<TotpStatusResponse>> {
        let mut conn = self.pool.acquire().await?;
        let user = user_service::find_user(&mut *conn, actor.user_id).await?;
        Ok(ApiResponse::success(self.totp.status(&user)))
    }
}
