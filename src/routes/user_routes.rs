use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::user_controller::UserController;
use crate::dto::user_dto::{CreateUserRequest, RoleUpdateRequest, UpdateUserRequest};
use crate::dto::ApiResponse;
use crate::models::{auth::AuthenticatedUser, user::User};
use crate::state::AppState;
use crate::utils::errors::AppError;

type UserResult = Result<Json<ApiResponse<User>>, AppError>;

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(me))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/role", patch(update_role))
}

fn controller(state: &AppState) -> UserController {
    UserController::new(state.pool.clone())
}

async fn me(State(state): State<AppState>, Extension(user): Extension<AuthenticatedUser>) -> UserResult {
    Ok(Json(controller(&state).me(&user).await?))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    Ok(Json(controller(&state).list(&user).await?))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> UserResult {
    Ok(Json(controller(&state).get(&user, id).await?))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), AppError> {
    let response = controller(&state).create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> UserResult {
    Ok(Json(controller(&state).update(&user, id, request).await?))
}

async fn update_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleUpdateRequest>,
) -> UserResult {
    Ok(Json(controller(&state).update_role(&user, id, request.role).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(controller(&state).delete(&user, id).await?))
}
