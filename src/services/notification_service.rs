//! Feed de notificaciones
//!
//! Registro de eventos visibles para el usuario. Los administradores ven el
//! feed global; el resto solo el suyo.

use uuid::Uuid;

use crate::models::{
    auth::{AuthenticatedUser, Permission},
    notification::{Notification, NotificationType},
};
use crate::repositories::NotificationStore;
use crate::utils::errors::{not_found_error, AppResult};

/// Emitir una notificación para un usuario
pub async fn notify<S>(
    store: &mut S,
    user_id: Uuid,
    kind: NotificationType,
    title: impl Into<String>,
    message: impl Into<String>,
    related: Option<(Uuid, &str)>,
) -> AppResult<Notification>
where
    S: NotificationStore + ?Sized,
{
    let notification = Notification::new(user_id, title.into(), message.into(), kind, related);
    let saved = store.insert_notification(&notification).await?;
    tracing::debug!(user_id = %user_id, kind = ?kind, "🔔 Notificación creada");
    Ok(saved)
}

/// Feed según el rol: global para quien puede verlo todo, propio para el resto
pub async fn feed<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<Vec<Notification>>
where
    S: NotificationStore + ?Sized,
{
    if actor.can(Permission::ViewAllNotifications) {
        store.list_all_notifications().await
    } else {
        store.list_notifications_for_user(actor.user_id).await
    }
}

pub async fn admin_feed<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<Vec<Notification>>
where
    S: NotificationStore + ?Sized,
{
    actor.require(Permission::ViewAllNotifications)?;
    store.list_all_notifications().await
}

pub async fn by_type<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    kind: NotificationType,
) -> AppResult<Vec<Notification>>
where
    S: NotificationStore + ?Sized,
{
    actor.require(Permission::ViewAllNotifications)?;
    store.list_notifications_by_type(kind).await
}

pub async fn unread_count<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<i64>
where
    S: NotificationStore + ?Sized,
{
    store.count_unread_notifications(Some(actor.user_id)).await
}

pub async fn admin_unread_count<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<i64>
where
    S: NotificationStore + ?Sized,
{
    actor.require(Permission::ViewAllNotifications)?;
    store.count_unread_notifications(None).await
}

async fn owned_notification<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
) -> AppResult<Notification>
where
    S: NotificationStore + ?Sized,
{
    let notification = store
        .find_notification(id)
        .await?
        .ok_or_else(|| not_found_error("Notification", id))?;
    actor.require_owner_or(notification.user_id, Permission::ViewAllNotifications)?;
    Ok(notification)
}

pub async fn mark_read<S>(store: &mut S, actor: &AuthenticatedUser, id: Uuid) -> AppResult<()>
where
    S: NotificationStore + ?Sized,
{
    owned_notification(store, actor, id).await?;
    store.mark_notification_read(id).await
}

pub async fn mark_all_read<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<u64>
where
    S: NotificationStore + ?Sized,
{
    store.mark_all_notifications_read(actor.user_id).await
}

pub async fn delete<S>(store: &mut S, actor: &AuthenticatedUser, id: Uuid) -> AppResult<()>
where
    S: NotificationStore + ?Sized,
{
    owned_notification(store, actor, id).await?;
    store.delete_notification(id).await
}

pub async fn clear_all<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<u64>
where
    S: NotificationStore + ?Sized,
{
    actor.require(Permission::ClearNotifications)?;
    let removed = store.clear_notifications().await?;
    tracing::info!(removed, by = %actor.email, "🧹 Notificaciones borradas");
    Ok(removed)
}
