use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{auth::Role, user::User};
use crate::repositories::UserStore;
use crate::utils::errors::{not_found_error, AppResult};

#[async_trait]
impl UserStore for PgConnection {
    async fn insert_user(&mut self, user: &User) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, role, first_name, last_name,
                               profile_image, totp_secret, totp_enabled, totp_verified,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.profile_image)
        .bind(&user.totp_secret)
        .bind(user.totp_enabled)
        .bind(user.totp_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&mut *self)
        .await?;

        Ok(user)
    }

    async fn find_user(&mut self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&mut *self)
            .await?;

        Ok(user)
    }

    async fn email_exists(&mut self, email: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email.trim())
                .fetch_one(&mut *self)
                .await?;

        Ok(result.0)
    }

    async fn list_users(&mut self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&mut *self)
            .await?;

        Ok(users)
    }

    async fn update_user_profile(
        &mut self,
        id: Uuid,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        profile_image: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, first_name = $3, last_name = $4, profile_image = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(profile_image)
        .bind(Utc::now())
        .fetch_optional(&mut *self)
        .await?
        .ok_or_else(|| not_found_error("User", id))
    }

    async fn update_user_role(&mut self, id: Uuid, role: Role) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .bind(Utc::now())
        .fetch_optional(&mut *self)
        .await?
        .ok_or_else(|| not_found_error("User", id))
    }

    async fn delete_user(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_totp_state(
        &mut self,
        id: Uuid,
        secret: Option<&str>,
        enabled: bool,
        verified: bool,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET totp_secret = $2, totp_enabled = $3, totp_verified = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(secret)
        .bind(enabled)
        .bind(verified)
        .bind(Utc::now())
        .execute(&mut *self)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("User", id));
        }
        Ok(())
    }

    async fn set_reset_token(
        &mut self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_password_token = $2, reset_password_expiry = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&mut *self)
        .await?;

        Ok(())
    }

    async fn find_user_by_reset_token(&mut self, token: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE reset_password_token = $1")
            .bind(token)
            .fetch_optional(&mut *self)
            .await?;

        Ok(user)
    }

    async fn update_password(&mut self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, reset_password_token = NULL,
                reset_password_expiry = NULL, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&mut *self)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("User", id));
        }
        Ok(())
    }
}
