use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::car_controller::CarController;
use crate::dto::car_dto::{
    AvailabilityRequest, CarRequest, CarResponse, CarSearchQuery, MaxPriceQuery, YearRangeQuery,
};
use crate::dto::{ApiResponse, PageResponse};
use crate::models::{auth::AuthenticatedUser, car::CarStats};
use crate::state::AppState;
use crate::utils::errors::AppError;

type CarList = Result<Json<ApiResponse<Vec<CarResponse>>>, AppError>;

pub fn create_car_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/available", get(available_cars))
        .route("/make/:make", get(cars_by_make))
        .route("/year-range", get(cars_by_year_range))
        .route("/max-price", get(cars_by_max_price))
        .route("/stats", get(car_stats))
        .route("/search", get(search_cars))
        .route("/rented", get(rented_cars))
        .route("/upload-image", post(upload_image))
        .route("/:id", get(get_car).put(update_car).delete(delete_car))
        .route("/:id/availability", patch(update_availability))
        .route("/:id/image", post(upload_car_image))
}

fn controller(state: &AppState) -> CarController {
    CarController::new(state.pool.clone())
}

async fn create_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CarRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CarResponse>>), AppError> {
    let response = controller(&state).create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_cars(State(state): State<AppState>) -> CarList {
    Ok(Json(controller(&state).list().await?))
}

async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    Ok(Json(controller(&state).get(id).await?))
}

async fn available_cars(State(state): State<AppState>) -> CarList {
    Ok(Json(controller(&state).available().await?))
}

async fn cars_by_make(State(state): State<AppState>, Path(make): Path<String>) -> CarList {
    Ok(Json(controller(&state).by_make(&make).await?))
}

async fn cars_by_year_range(
    State(state): State<AppState>,
    Query(query): Query<YearRangeQuery>,
) -> CarList {
    Ok(Json(
        controller(&state)
            .by_year_range(query.start_year, query.end_year)
            .await?,
    ))
}

async fn cars_by_max_price(
    State(state): State<AppState>,
    Query(query): Query<MaxPriceQuery>,
) -> CarList {
    Ok(Json(controller(&state).by_max_price(query.max_price).await?))
}

async fn car_stats(State(state): State<AppState>) -> Result<Json<ApiResponse<CarStats>>, AppError> {
    Ok(Json(controller(&state).stats().await?))
}

async fn search_cars(
    State(state): State<AppState>,
    Query(query): Query<CarSearchQuery>,
) -> Result<Json<ApiResponse<PageResponse<CarResponse>>>, AppError> {
    Ok(Json(controller(&state).search(query).await?))
}

async fn rented_cars(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> CarList {
    Ok(Json(controller(&state).rented(&user).await?))
}

async fn update_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<CarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    Ok(Json(controller(&state).update(&user, id, request).await?))
}

async fn update_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    Ok(Json(
        controller(&state)
            .update_availability(&user, id, request.is_available)
            .await?,
    ))
}

async fn delete_car(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).delete(&user, id).await?))
}

async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<String>>, AppError> {
    Ok(Json(
        controller(&state)
            .upload_image(&user, state.images.local(), multipart)
            .await?,
    ))
}

async fn upload_car_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    Ok(Json(
        controller(&state)
            .upload_car_image(&user, state.images.local(), id, multipart)
            .await?,
    ))
}
