use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::car::{Car, CarFilter, CarSortKey, DriveType, SortDirection, TransmissionType};
use crate::repositories::PageRequest;
use crate::utils::validation::validate_positive_amount;

/// Alta o reemplazo completo de un coche
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CarRequest {
    #[validate(length(min = 1, max = 100))]
    pub make: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(range(min = 1886, max = 2100))]
    pub year: i32,
    pub color: Option<String>,
    pub transmission: TransmissionType,
    pub drive_type: DriveType,
    #[validate(range(min = 0))]
    pub fuel_efficiency: Option<i32>,
    #[validate(custom = "validate_positive_amount")]
    pub price_per_day: Decimal,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRangeQuery {
    pub start_year: i32,
    pub end_year: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxPriceQuery {
    pub max_price: Decimal,
}

/// Parámetros de `/api/cars/search`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSearchQuery {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub transmission: Option<TransmissionType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_available: Option<bool>,
    pub sort_by: Option<CarSortKey>,
    pub sort_direction: Option<SortDirection>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl CarSearchQuery {
    pub fn into_parts(self) -> (CarFilter, PageRequest) {
        let page = PageRequest::new(self.page, self.size);
        let filter = CarFilter {
            make: self.make,
            model: self.model,
            year: self.year,
            transmission: self.transmission,
            min_price: self.min_price,
            max_price: self.max_price,
            only_available: self.is_available,
            sort_by: self.sort_by,
            sort_direction: self.sort_direction,
        };
        (filter, page)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
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

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            make: car.make,
            model: car.model,
            year: car.year,
            color: car.color,
            transmission: car.transmission,
            drive_type: car.drive_type,
            fuel_efficiency: car.fuel_efficiency,
            price_per_day: car.price_per_day,
            image_url: car.image_url.as_deref().and_then(normalize_image_url),
            is_available: car.is_available,
            created_at: car.created_at,
            updated_at: car.updated_at,
        }
    }
}

/// Las rutas relativas se sirven desde `/cars/`
pub fn normalize_image_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("/cars/") || url.starts_with("http") {
        return Some(url.to_string());
    }
    let name = url.rsplit('/').next().unwrap_or(url);
    Some(format!("/cars/{}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_image_url() {
        assert_eq!(normalize_image_url("/cars/a.png").as_deref(), Some("/cars/a.png"));
        assert_eq!(
            normalize_image_url("https://res.cloudinary.com/x.png").as_deref(),
            Some("https://res.cloudinary.com/x.png")
        );
        assert_eq!(normalize_image_url("a.png").as_deref(), Some("/cars/a.png"));
        assert_eq!(normalize_image_url("uploads/a.png").as_deref(), Some("/cars/a.png"));
        assert_eq!(normalize_image_url("  "), None);
    }

    #[test]
    fn test_car_request_validation() {
        let request: CarRequest = serde_json::from_value(serde_json::json!({
            "make": "Ford",
            "model": "Focus",
            "year": 2020,
            "transmission": "MANUAL",
            "driveType": "FWD",
            "pricePerDay": "-1"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
