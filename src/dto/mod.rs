//! DTOs de entrada y salida de la API

pub mod api_response;
pub mod auth_dto;
pub mod car_dto;
pub mod payment_dto;
pub mod reservation_dto;
pub mod user_dto;

pub use api_response::{ApiResponse, PageResponse};
