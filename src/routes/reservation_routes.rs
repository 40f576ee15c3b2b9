use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::reservation_controller::ReservationController;
use crate::dto::reservation_dto::{CreateReservationRequest, ReservationResponse, StatusUpdateRequest};
use crate::dto::ApiResponse;
use crate::models::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

type ReservationList = Result<Json<ApiResponse<Vec<ReservationResponse>>>, AppError>;
type SingleReservation = Result<Json<ApiResponse<ReservationResponse>>, AppError>;

pub fn create_reservation_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reservations).post(create_reservation))
        .route("/my-reservations", get(my_reservations))
        .route("/user/:user_id", get(reservations_by_user))
        .route("/car/:car_id", get(reservations_by_car))
        .route("/:id", get(get_reservation).delete(delete_reservation))
        .route("/:id/status", patch(update_status))
        .route("/:id/cancel", patch(cancel_reservation))
}

fn controller(state: &AppState) -> ReservationController {
    ReservationController::new(state.pool.clone())
}

async fn create_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationResponse>>), AppError> {
    let response = controller(&state).create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_reservations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ReservationList {
    Ok(Json(controller(&state).list(&user).await?))
}

async fn my_reservations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ReservationList {
    Ok(Json(controller(&state).mine(&user).await?))
}

async fn reservations_by_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
) -> ReservationList {
    Ok(Json(controller(&state).by_user(&user, user_id).await?))
}

async fn reservations_by_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(car_id): Path<Uuid>,
) -> ReservationList {
    Ok(Json(controller(&state).by_car(&user, car_id).await?))
}

async fn get_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> SingleReservation {
    Ok(Json(controller(&state).get(&user, id).await?))
}

/// `PATCH /:id/status?status=CONFIRMED`
async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusUpdateRequest>,
) -> SingleReservation {
    Ok(Json(controller(&state).update_status(&user, id, query.status).await?))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> SingleReservation {
    Ok(Json(controller(&state).cancel(&user, id).await?))
}

async fn delete_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).delete(&user, id).await?))
}
