//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. Los servicios
//! reciben el almacenamiento (`&mut S` sobre los traits de `repositories`) y
//! el usuario autenticado de forma explícita; los controladores les pasan la
//! transacción abierta.

pub mod auth_service;
pub mod car_service;
pub mod email_service;
pub mod file_storage_service;
pub mod image_upload_service;
pub mod notification_service;
pub mod payment_service;
pub mod reservation_service;
pub mod totp_service;
pub mod user_service;

pub use auth_service::{AuthService, SignInOutcome};
pub use email_service::{mailer_from_config, Mailer};
pub use file_storage_service::FileStorage;
pub use image_upload_service::ImageUploader;
pub use totp_service::TotpService;
