//! Controladores: abren la transacción o conexión, llaman a los servicios
//! y convierten el resultado al sobre `ApiResponse`.

pub mod auth_controller;
pub mod car_controller;
pub mod image_controller;
pub mod notification_controller;
pub mod payment_controller;
pub mod reservation_controller;
pub mod totp_controller;
pub mod user_controller;
