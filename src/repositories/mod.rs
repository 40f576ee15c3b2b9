//! Acceso a datos
//!
//! Cada entidad expone un trait de almacenamiento implementado para
//! `PgConnection`. Los servicios reciben `&mut S` y los controladores les pasan
//! una transacción abierta (`&mut *tx`), de modo que cada operación de negocio
//! se ejecuta dentro de una única transacción.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    auth::Role,
    car::{Car, CarFilter, CarStats},
    notification::{Notification, NotificationType},
    payment::{Payment, PaymentStatus},
    reservation::{Reservation, ReservationStatus},
    user::User,
};
use crate::utils::errors::AppResult;

pub mod car_repository;
pub mod notification_repository;
pub mod payment_repository;
pub mod reservation_repository;
pub mod user_repository;

#[cfg(test)]
pub mod memory;

/// Página solicitada (índice base 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub const MAX_SIZE: i64 = 100;

    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(0).max(0),
            size: size.unwrap_or(10).clamp(1, Self::MAX_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

#[async_trait]
pub trait CarStore: Send {
    async fn insert_car(&mut self, car: &Car) -> AppResult<Car>;
    async fn find_car(&mut self, id: Uuid) -> AppResult<Option<Car>>;
    /// Igual que `find_car` pero bloquea la fila hasta el fin de la transacción
    async fn lock_car(&mut self, id: Uuid) -> AppResult<Option<Car>>;
    async fn list_cars(&mut self) -> AppResult<Vec<Car>>;
    async fn list_available_cars(&mut self) -> AppResult<Vec<Car>>;
    async fn find_cars_by_make(&mut self, make: &str) -> AppResult<Vec<Car>>;
    async fn find_cars_by_year_range(&mut self, from: i32, to: i32) -> AppResult<Vec<Car>>;
    async fn find_cars_by_max_price(&mut self, max_price: Decimal) -> AppResult<Vec<Car>>;
    async fn update_car(&mut self, car: &Car) -> AppResult<Car>;
    async fn set_car_availability(&mut self, id: Uuid, available: bool) -> AppResult<()>;
    /// Borra el coche y, en cascada, sus reservas. Devuelve false si no existía.
    async fn delete_car(&mut self, id: Uuid) -> AppResult<bool>;
    async fn filter_cars(&mut self, filter: &CarFilter, page: PageRequest) -> AppResult<(Vec<Car>, i64)>;
    async fn car_stats(&mut self) -> AppResult<CarStats>;
    async fn cars_rented_by_user(&mut self, user_id: Uuid) -> AppResult<Vec<Car>>;
}

#[async_trait]
pub trait ReservationStore: Send {
    async fn insert_reservation(&mut self, reservation: &Reservation) -> AppResult<Reservation>;
    async fn find_reservation(&mut self, id: Uuid) -> AppResult<Option<Reservation>>;
    async fn list_reservations(&mut self) -> AppResult<Vec<Reservation>>;
    async fn list_reservations_by_user(&mut self, user_id: Uuid) -> AppResult<Vec<Reservation>>;
    async fn list_reservations_by_car(&mut self, car_id: Uuid) -> AppResult<Vec<Reservation>>;
    /// Reservas PENDING/CONFIRMED del coche que comparten algún instante con `[start, end]`
    async fn find_overlapping_reservations(
        &mut self,
        car_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>>;
    /// Reservas PENDING/CONFIRMED del coche cuyo fin aún no ha pasado
    async fn find_active_reservations_for_car(
        &mut self,
        car_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>>;
    async fn update_reservation_status(
        &mut self,
        id: Uuid,
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Reservation>;
    async fn delete_reservation(&mut self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait UserStore: Send {
    async fn insert_user(&mut self, user: &User) -> AppResult<User>;
    async fn find_user(&mut self, id: Uuid) -> AppResult<Option<User>>;
    /// Búsqueda por email sin distinguir mayúsculas
    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>>;
    async fn email_exists(&mut self, email: &str) -> AppResult<bool>;
    async fn list_users(&mut self) -> AppResult<Vec<User>>;
    async fn update_user_profile(
        &mut self,
        id: Uuid,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        profile_image: Option<&str>,
    ) -> AppResult<User>;
    async fn update_user_role(&mut self, id: Uuid, role: Role) -> AppResult<User>;
    async fn delete_user(&mut self, id: Uuid) -> AppResult<bool>;
    async fn set_totp_state(
        &mut self,
        id: Uuid,
        secret: Option<&str>,
        enabled: bool,
        verified: bool,
    ) -> AppResult<()>;
    async fn set_reset_token(
        &mut self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;
    async fn find_user_by_reset_token(&mut self, token: &str) -> AppResult<Option<User>>;
    /// Cambia el hash y limpia el token de recuperación
    async fn update_password(&mut self, id: Uuid, password_hash: &str) -> AppResult<()>;
}

#[async_trait]
pub trait PaymentStore: Send {
    async fn insert_payment(&mut self, payment: &Payment) -> AppResult<Payment>;
    async fn find_payment(&mut self, id: Uuid) -> AppResult<Option<Payment>>;
    async fn find_payment_by_reservation(&mut self, reservation_id: Uuid) -> AppResult<Option<Payment>>;
    async fn transaction_id_exists(&mut self, transaction_id: &str) -> AppResult<bool>;
    async fn list_payments(&mut self) -> AppResult<Vec<Payment>>;
    async fn update_payment(&mut self, payment: &Payment) -> AppResult<Payment>;
    async fn update_payment_status(&mut self, id: Uuid, status: PaymentStatus) -> AppResult<Payment>;
}

#[async_trait]
pub trait NotificationStore: Send {
    async fn insert_notification(&mut self, notification: &Notification) -> AppResult<Notification>;
    async fn find_notification(&mut self, id: Uuid) -> AppResult<Option<Notification>>;
    async fn list_all_notifications(&mut self) -> AppResult<Vec<Notification>>;
    async fn list_notifications_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<Notification>>;
    async fn list_notifications_by_type(&mut self, kind: NotificationType) -> AppResult<Vec<Notification>>;
    async fn mark_notification_read(&mut self, id: Uuid) -> AppResult<()>;
    async fn mark_all_notifications_read(&mut self, user_id: Uuid) -> AppResult<u64>;
    async fn delete_notification(&mut self, id: Uuid) -> AppResult<()>;
    async fn clear_notifications(&mut self) -> AppResult<u64>;
    /// `None` cuenta las no leídas de todo el sistema
    async fn count_unread_notifications(&mut self, user_id: Option<Uuid>) -> AppResult<i64>;
}
