use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de evento - mapea al ENUM notification_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "notification_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    UserRegistered,
    ReservationCreated,
    ReservationUpdated,
    ReservationCancelled,
    PaymentCompleted,
    PaymentFailed,
    System,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub read: bool,
    pub related_entity_id: Option<Uuid>,
    pub related_entity_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        title: String,
        message: String,
        notification_type: NotificationType,
        related: Option<(Uuid, &str)>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            message,
            notification_type,
            read: false,
            related_entity_id: related.map(|(id, _)| id),
            related_entity_type: related.map(|(_, kind)| kind.to_string()),
            created_at: Utc::now(),
        }
    }
}
