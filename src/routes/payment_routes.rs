use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::payment_controller::PaymentController;
use crate::dto::payment_dto::{CreatePaymentRequest, InitiatePaymentQuery, PaymentStatusQuery};
use crate::dto::ApiResponse;
use crate::models::{auth::AuthenticatedUser, payment::Payment};
use crate::state::AppState;
use crate::utils::errors::AppError;

type PaymentResult = Result<Json<ApiResponse<Payment>>, AppError>;

pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(create_payment))
        .route("/initiate", post(initiate_payment))
        .route("/reservation/:reservation_id", get(payment_by_reservation))
        .route("/:id", get(get_payment))
        .route("/:id/status", patch(update_payment_status))
}

fn controller(state: &AppState) -> PaymentController {
    PaymentController::new(state.pool.clone())
}

async fn create_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreatePaymentRequest>,
) -> PaymentResult {
    Ok(Json(controller(&state).create(&user, request).await?))
}

/// `POST /initiate?reservationId=...`
async fn initiate_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<InitiatePaymentQuery>,
) -> PaymentResult {
    Ok(Json(controller(&state).initiate(&user, query.reservation_id).await?))
}

async fn list_payments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, AppError> {
    Ok(Json(controller(&state).list(&user).await?))
}

async fn get_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> PaymentResult {
    Ok(Json(controller(&state).get(&user, id).await?))
}

async fn payment_by_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(reservation_id): Path<Uuid>,
) -> PaymentResult {
    Ok(Json(controller(&state).by_reservation(&user, reservation_id).await?))
}

/// `PATCH /:id/status?status=COMPLETED`
async fn update_payment_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<PaymentStatusQuery>,
) -> PaymentResult {
    Ok(Json(controller(&state).update_status(&user, id, query.status).await?))
}
