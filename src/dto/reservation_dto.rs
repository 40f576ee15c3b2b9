use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::car_dto::normalize_image_url;
use crate::models::{
    car::Car,
    reservation::{Reservation, ReservationStatus},
    user::User,
};
use crate::utils::validation::deserialize_flexible_date;

/// Petición de reserva. Solo cuenta el día de cada fecha.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub car_id: Uuid,
    /// Por defecto el usuario autenticado
    pub user_id: Option<Uuid>,
    #[serde(deserialize_with = "deserialize_flexible_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_flexible_date")]
    pub end_date: NaiveDate,
    /// Si falta se calcula con el precio diario del coche
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ReservationStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: Uuid,
    pub car_id: Uuid,
    pub car_details: Option<String>,
    pub car_image_url: Option<String>,
    pub user_id: Uuid,
    pub user_email: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationResponse {
    pub fn from_parts(reservation: Reservation, car: Option<&Car>, user: Option<&User>) -> Self {
        Self {
            id: reservation.id,
            car_id: reservation.car_id,
            car_details: car.map(Car::display_name),
            car_image_url: car
                .and_then(|c| c.image_url.as_deref())
                .and_then(normalize_image_url),
            user_id: reservation.user_id,
            user_email: user.map(|u| u.email.clone()),
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            total_price: reservation.total_price,
            status: reservation.status,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}
