//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión al sobre uniforme `{success, data, message}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Car unavailable: {0}")]
    Unavailable(String),

    #[error("Reservation conflict: {0}")]
    ReservationConflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),

    #[error("Amount mismatch: {0}")]
    AmountMismatch(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("External API error: {0}")]
    ExternalApi(String),
}

impl AppError {
    /// Código HTTP y código simbólico de cada variante
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::InvalidRange(_) => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
            AppError::Unavailable(_) => (StatusCode::BAD_REQUEST, "UNAVAILABLE"),
            AppError::ReservationConflict(_) => (StatusCode::BAD_REQUEST, "RESERVATION_CONFLICT"),
            AppError::InvalidState(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            AppError::DuplicateTransaction(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_TRANSACTION"),
            AppError::AmountMismatch(_) => (StatusCode::BAD_REQUEST, "AMOUNT_MISMATCH"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            AppError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
            AppError::Jwt(_) => (StatusCode::UNAUTHORIZED, "JWT_ERROR"),
            AppError::Hash(_) => (StatusCode::INTERNAL_SERVER_ERROR, "HASH_ERROR"),
            AppError::ExternalApi(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_API_ERROR"),
        }
    }

    /// Mensaje visible para el cliente. Los errores internos no exponen detalles.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "An error occurred while accessing the database".to_string(),
            AppError::Validation(_) => "The provided data is invalid".to_string(),
            AppError::Internal(_) | AppError::Io(_) => "An unexpected error occurred".to_string(),
            AppError::Hash(_) => "An error occurred while processing credentials".to_string(),
            AppError::ExternalApi(_) => {
                "An error occurred while communicating with external service".to_string()
            }
            AppError::RateLimitExceeded => "Too many requests. Please try again later".to_string(),
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::InvalidRange(msg)
            | AppError::Unavailable(msg)
            | AppError::ReservationConflict(msg)
            | AppError::InvalidState(msg)
            | AppError::DuplicateTransaction(msg)
            | AppError::AmountMismatch(msg)
            | AppError::Jwt(msg) => msg.clone(),
        }
    }
}

/// Sobre de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    data: Option<serde_json::Value>,
    message: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "❌ Error interno");
        } else if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::warn!(code, error = %self, "🔒 Acceso rechazado");
        } else {
            tracing::debug!(code, error = %self, "Solicitud rechazada");
        }

        let data = match &self {
            AppError::Validation(e) => Some(json!(e)),
            _ => None,
        };

        let body = ErrorResponse {
            success: false,
            data,
            message: self.public_message(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} not found with id: {}", resource, id))
}
