//! Modelo de Car
//!
//! `is_available` es una caché derivada de las reservas activas; la mantiene
//! el gestor de reservas en cada transición de estado.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de transmisión - mapea al ENUM transmission_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "transmission_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransmissionType {
    Automatic,
    Manual,
}

/// Tracción - mapea al ENUM drive_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "drive_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DriveType {
    Fwd,
    Rwd,
    Awd,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub transmission: TransmissionType,
    pub drive_type: DriveType,
    pub fuel_efficiency: Option<i32>,
    pub price_per_day: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Nombre corto que se muestra en reservas y notificaciones
    pub fn display_name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

/// Claves de ordenación permitidas en la búsqueda
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CarSortKey {
    Make,
    Model,
    Year,
    PricePerDay,
    #[default]
    CreatedAt,
}

impl CarSortKey {
    pub fn column(&self) -> &'static str {
        match self {
            CarSortKey::Make => "make",
            CarSortKey::Model => "model",
            CarSortKey::Year => "year",
            CarSortKey::PricePerDay => "price_per_day",
            CarSortKey::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Filtros de búsqueda de coches
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarFilter {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub transmission: Option<TransmissionType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub only_available: Option<bool>,
    pub sort_by: Option<CarSortKey>,
    pub sort_direction: Option<SortDirection>,
}

/// Agregados del catálogo
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarStats {
    pub total_cars: i64,
    pub available_cars: i64,
    pub active_reservations: i64,
    pub average_price: Option<Decimal>,
    pub pending_reservations: i64,
    pub total_revenue: Decimal,
}
