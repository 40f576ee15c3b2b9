//! Routers por recurso bajo `/api/*`

pub mod auth_routes;
pub mod car_routes;
pub mod image_routes;
pub mod notification_routes;
pub mod payment_routes;
pub mod reservation_routes;
pub mod totp_routes;
pub mod user_routes;
