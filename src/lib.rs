//! Backend de alquiler de coches
//!
//! API REST sobre axum + PostgreSQL: catálogo de coches, reservas sin
//! solapamientos, pagos simulados, notificaciones y autenticación JWT con
//! segundo factor TOTP.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::dto::ApiResponse;
use crate::middleware::{cors_middleware, rate_limit_middleware, require_auth};
use crate::state::AppState;

/// Construye el router completo con sus capas
pub fn build_router(state: AppState) -> Router {
    let auth = routes::auth_routes::create_auth_router().route_layer(
        axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware),
    );

    let protected = Router::new()
        .nest("/api/cars", routes::car_routes::create_car_router())
        .nest("/api/reservations", routes::reservation_routes::create_reservation_router())
        .nest("/api/users", routes::user_routes::create_user_router())
        .nest("/api/totp", routes::totp_routes::create_totp_router())
        .nest("/api/notifications", routes::notification_routes::create_notification_router())
        .nest("/api/images", routes::image_routes::create_image_router())
        .nest("/api/payments", routes::payment_routes::create_payment_router())
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = cors_middleware(&state.config.cors_origins);
    let static_images = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth)
        .merge(protected)
        .nest_service("/cars", static_images)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success_with_message(
        json!({
            "status": "UP",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }),
        "Service is running",
    ))
}
