use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::notification::{Notification, NotificationType};
use crate::repositories::NotificationStore;
use crate::utils::errors::{not_found_error, AppResult};

#[async_trait]
impl NotificationStore for PgConnection {
    async fn insert_notification(&mut self, notification: &Notification) -> AppResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, title, message, notification_type, read,
                                       related_entity_id, related_entity_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type)
        .bind(notification.read)
        .bind(notification.related_entity_id)
        .bind(&notification.related_entity_type)
        .bind(notification.created_at)
        .fetch_one(&mut *self)
        .await?;

        Ok(notification)
    }

    async fn find_notification(&mut self, id: Uuid) -> AppResult<Option<Notification>> {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self)
                .await?;

        Ok(notification)
    }

    async fn list_all_notifications(&mut self) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications ORDER BY created_at DESC",
        )
        .fetch_all(&mut *self)
        .await?;

        Ok(notifications)
    }

    async fn list_notifications_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&mut *self)
        .await?;

        Ok(notifications)
    }

    async fn list_notifications_by_type(
        &mut self,
        kind: NotificationType,
    ) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE notification_type = $1 ORDER BY created_at DESC",
        )
        .bind(kind)
        .fetch_all(&mut *self)
        .await?;

        Ok(notifications)
    }

    async fn mark_notification_read(&mut self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *self)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Notification", id));
        }
        Ok(())
    }

    async fn mark_all_notifications_read(&mut self, user_id: Uuid) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
                .bind(user_id)
                .execute(&mut *self)
                .await?;

        Ok(result.rows_affected())
    }

    async fn delete_notification(&mut self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&mut *self)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Notification", id));
        }
        Ok(())
    }

    async fn clear_notifications(&mut self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications")
            .execute(&mut *self)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread_notifications(&mut self, user_id: Option<Uuid>) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE read = FALSE AND ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&mut *self)
        .await?;

        Ok(count)
    }
}
