use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::ApiResponse;
use crate::models::{
    auth::AuthenticatedUser,
    notification::{Notification, NotificationType},
};
use crate::services::notification_service;
use crate::utils::errors::AppResult;

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

pub struct NotificationController {
    pool: PgPool,
}

impl NotificationController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn feed(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<Notification>>> {
        let mut conn = self.pool.acquire().await?;
        Ok(ApiResponse::success(notification_service::feed(&mut *conn, actor).await?))
    }

    pub async fn admin_feed(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<Notification>>> {
        let mut conn = self.pool.acquire().await?;
        Ok(ApiResponse::success(notification_service::admin_feed(&mut *conn, actor).await?))
    }

    pub async fn by_type(
        &self,
        actor: &AuthenticatedUser,
        kind: NotificationType,
    ) -> AppResult<ApiResponse<Vec<Notification>>> {
        let mut conn = self.pool.acquire().await?;
        Ok(ApiResponse::success(notification_service::by_type(&mut *conn, actor, kind).await?))
    }

    pub async fn unread_count(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<CountResponse>> {
        let mut conn = self.pool.acquire().await?;
        let count = notification_service::unread_count(&mut *conn, actor).await?;
        Ok(ApiResponse::success(CountResponse { count }))
    }

    pub async fn admin_unread_count(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<CountResponse>> {
        let mut conn = self.pool.acquire().await?;
        let count = notification_service::admin_unread_count(&mut *conn, actor).await?;
        Ok(ApiResponse::success(CountResponse { count }))
    }

    pub async fn mark_read(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut conn = self.pool.acquire().await?;
        notification_service::mark_read(&mut *conn, actor, id).await?;
        Ok(ApiResponse::message("Notification marked as read"))
    }

    pub async fn mark_all_read(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<CountResponse>> {
        let mut conn = self.pool.acquire().await?;
        let updated = notification_service::mark_all_read(&mut *conn, actor).await?;
        Ok(ApiResponse::success_with_message(
            CountResponse { count: updated as i64 },
            "All notifications marked as read",
        ))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut conn = self.pool.acquire().await?;
        notification_service::delete(&mut *conn, actor, id).await?;
        Ok(ApiResponse::message("Notification deleted"))
    }

    pub async fn clear_all(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<CountResponse>> {
        let mut conn = self.pool.acquire().await?;
        let removed = notification_service::clear_all(&mut *conn, actor).await?;
        Ok(ApiResponse::success_with_message(
            CountResponse { count: removed as i64 },
            "All notifications cleared",
        ))
    }
}
