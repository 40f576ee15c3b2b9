//! Modelo de Reservation
//!
//! Una reserva une un usuario y un coche durante una ventana de días.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la reserva - mapea al ENUM reservation_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// PENDING y CONFIRMED reclaman el coche
    pub const ACTIVE: [ReservationStatus; 2] =
        [ReservationStatus::Pending, ReservationStatus::Confirmed];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        car_id: Uuid,
        user_id: Uuid,
        range: DateRange,
        total_price: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            car_id,
            user_id,
            start_date: range.start,
            end_date: range.end,
            total_price,
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// Intervalo cerrado `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Granularidad de día: inicio a las 00:00:00 y fin al último instante del día.
    /// `None` si el fin cae fuera del rango representable.
    pub fn whole_days(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        Some(Self {
            start: start_of_day(start),
            end: end_of_day(end)?,
        })
    }

    /// Dos intervalos se solapan si comparten al menos un instante
    /// (los extremos cuentan).
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Último microsegundo del día (precisión de TIMESTAMPTZ)
pub fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    let next = date.succ_opt()?;
    Some(start_of_day(next) - chrono::Duration::microseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_whole_days_normalization() {
        let range = DateRange::whole_days(day(2030, 1, 1), day(2030, 1, 5)).unwrap();
        assert_eq!(range.start.to_rfc3339(), "2030-01-01T00:00:00+00:00");
        assert_eq!(
            range.end.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            "2030-01-05 23:59:59.999999"
        );
    }

    #[test]
    fn test_overlap_is_inclusive_and_symmetric() {
        let a = DateRange::whole_days(day(2030, 1, 1), day(2030, 1, 5)).unwrap();
        let touching = DateRange::whole_days(day(2030, 1, 5), day(2030, 1, 8)).unwrap();
        let inside = DateRange::whole_days(day(2030, 1, 2), day(2030, 1, 3)).unwrap();
        let after = DateRange::whole_days(day(2030, 1, 6), day(2030, 1, 9)).unwrap();

        assert!(a.overlaps(&touching));
        assert!(touching.overlaps(&a));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
        assert!(!a.overlaps(&after));
        assert!(!after.overlaps(&a));
    }

    #[test]
    fn test_last_representable_day_has_no_end() {
        assert!(end_of_day(NaiveDate::MAX).is_none());
        assert!(DateRange::whole_days(day(2030, 1, 1), NaiveDate::MAX).is_none());
    }

    #[test]
    fn test_active_statuses() {
        assert!(ReservationStatus::Pending.is_active());
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(!ReservationStatus::Completed.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }
}
