use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::payment::PaymentStatus;
use crate::utils::validation::validate_positive_amount;

/// Pago directo ya completado en la pasarela
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub reservation_id: Uuid,
    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
    #[validate(length(min = 1, max = 100))]
    pub transaction_id: String,
    pub payment_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentQuery {
    pub reservation_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusQuery {
    pub status: PaymentStatus,
}
