use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::payment_dto::CreatePaymentRequest;
use crate::dto::ApiResponse;
use crate::models::{
    auth::AuthenticatedUser,
    payment::{Payment, PaymentStatus},
};
use crate::services::payment_service;
use crate::utils::errors::AppResult;

pub struct PaymentController {
    pool: PgPool,
}

impl PaymentController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, actor: &AuthenticatedUser, request: CreatePaymentRequest) -> AppResult<ApiResponse<Payment>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let payment = payment_service::create_payment(&mut *tx, actor, request, Utc::now()).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(payment, "Payment processed successfully"))
    }

    pub async fn initiate(&self, actor: &AuthenticatedUser, reservation_id: Uuid) -> AppResult<ApiResponse<Payment>> {
        let mut tx = self.pool.begin().await?;
        let payment = payment_service::initiate_payment(&mut *tx, actor, reservation_id, Utc::now()).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(payment, "Payment initiated"))
    }

    pub async fn get(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<Payment>> {
        let mut conn = self.pool.acquire().await?;
        let payment = payment_service::get_payment(&mut *conn, actor, id).await?;
        Ok(ApiResponse::success(payment))
    }

    pub async fn by_reservation(&self, actor: &AuthenticatedUser, reservation_id: Uuid) -> AppResult<ApiResponse<Payment>> {
        let mut conn = self.pool.acquire().await?;
        let payment = payment_service::get_payment_by_reservation(&mut *conn, actor, reservation_id).await?;
        Ok(ApiResponse::success(payment))
    }

    pub async fn list(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<Payment>>> {
        let mut conn = self.pool.acquire().await?;
        Ok(ApiResponse::success(payment_service::list_payments(&mut *conn, actor).await?))
    }

    pub async fn update_status(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        status: PaymentStatus,
    ) -> AppResult<ApiResponse<Payment>> {
        let mut tx = self.pool.begin().await?;
        let payment = payment_service::update_payment_status(&mut *tx, actor, id, status, Utc::now()).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(payment, "Payment status updated"))
    }
}
