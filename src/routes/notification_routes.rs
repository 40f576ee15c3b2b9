use axum::{
    extract::{Path, State},
    routing::{delete, get, patch},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::notification_controller::{CountResponse, NotificationController};
use crate::dto::ApiResponse;
use crate::models::{
    auth::AuthenticatedUser,
    notification::{Notification, NotificationType},
};
use crate::state::AppState;
use crate::utils::errors::AppError;

type NotificationList = Result<Json<ApiResponse<Vec<Notification>>>, AppError>;
type Count = Result<Json<ApiResponse<CountResponse>>, AppError>;

pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed))
        .route("/admin", get(admin_feed))
        .route("/unread-count", get(unread_count))
        .route("/admin/unread-count", get(admin_unread_count))
        .route("/admin/clear-all", delete(clear_all))
        .route("/type/:kind", get(by_type))
        .route("/read-all", patch(mark_all_read))
        .route("/:id/read", patch(mark_read))
        .route("/:id", delete(delete_notification))
}

fn controller(state: &AppState) -> NotificationController {
    NotificationController::new(state.pool.clone())
}

async fn feed(State(state): State<AppState>, Extension(user): Extension<AuthenticatedUser>) -> NotificationList {
    Ok(Json(controller(&state).feed(&user).await?))
}

async fn admin_feed(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> NotificationList {
    Ok(Json(controller(&state).admin_feed(&user).await?))
}

async fn by_type(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(kind): Path<NotificationType>,
) -> NotificationList {
    Ok(Json(controller(&state).by_type(&user, kind).await?))
}

async fn unread_count(State(state): State<AppState>, Extension(user): Extension<AuthenticatedUser>) -> Count {
    Ok(Json(controller(&state).unread_count(&user).await?))
}

async fn admin_unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Count {
    Ok(Json(controller(&state).admin_unread_count(&user).await?))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).mark_read(&user, id).await?))
}

async fn mark_all_read(State(state): State<AppState>, Extension(user): Extension<AuthenticatedUser>) -> Count {
    Ok(Json(controller(&state).mark_all_read(&user).await?))
}

async fn delete_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).delete(&user, id).await?))
}

async fn clear_all(State(state): State<AppState>, Extension(user): Extension<AuthenticatedUser>) -> Count {
    Ok(Json(controller(&state).clear_all(&user).await?))
}
