use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::{CreateUserRequest, UpdateUserRequest};
use crate::dto::ApiResponse;
use crate::models::{
    auth::{AuthenticatedUser, Role},
    user::User,
};
use crate::services::user_service;
use crate::utils::errors::AppResult;

pub struct UserController {
    pool: PgPool,
}

impl UserController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn me(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<User>> {
        let mut conn = self.pool.acquire().await?;
        Ok(ApiResponse::success(user_service::find_user(&mut *conn, actor.user_id).await?))
    }

    pub async fn list(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<User>>> {
        let mut conn = self.pool.acquire().await?;
        Ok(ApiResponse::success(user_service::list_users(&mut *conn, actor).await?))
    }

    pub async fn get(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<User>> {
        let mut conn = self.pool.acquire().await?;
        Ok(ApiResponse::success(user_service::get_user(&mut *conn, actor, id).await?))
    }

    pub async fn create(&self, actor: &AuthenticatedUser, request: CreateUserRequest) -> AppResult<ApiResponse<User>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let user = user_service::create_user(&mut *tx, actor, request).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(user, "User created successfully"))
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> AppResult<ApiResponse<User>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let user = user_service::update_user(&mut *tx, actor, id, request).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(user, "User updated successfully"))
    }

    pub async fn update_role(&self, actor: &AuthenticatedUser, id: Uuid, role: Role) -> AppResult<ApiResponse<User>> {
        let mut tx = self.pool.begin().await?;
        let user = user_service::update_role(&mut *tx, actor, id, role).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(user, "User role updated successfully"))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.pool.begin().await?;
        user_service::delete_user(&mut *tx, actor, id).await?;
        tx.commit().await?;

        Ok(ApiResponse::message("User deleted successfully"))
    }
}
