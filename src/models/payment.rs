//! Modelo de Payment (stub sin pasarela real)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del pago - mapea al ENUM payment_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

pub const PENDING_PAYMENT_METHOD: &str = "PENDING";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub payment_details: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        reservation_id: Uuid,
        amount: Decimal,
        payment_method: String,
        transaction_id: String,
        status: PaymentStatus,
        payment_details: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            amount,
            payment_method,
            transaction_id,
            status,
            payment_details,
            payment_date: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Identificador de transacción generado para pagos iniciados
pub fn generate_transaction_id() -> String {
    format!("TXN-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}
