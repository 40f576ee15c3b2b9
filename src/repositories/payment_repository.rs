use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::payment::{Payment, PaymentStatus};
use crate::repositories::PaymentStore;
use crate::utils::errors::{not_found_error, AppResult};

#[async_trait]
impl PaymentStore for PgConnection {
    async fn insert_payment(&mut self, payment: &Payment) -> AppResult<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, reservation_id, amount, payment_method, transaction_id,
                                  status, payment_details, payment_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(payment.reservation_id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.transaction_id)
        .bind(payment.status)
        .bind(&payment.payment_details)
        .bind(payment.payment_date)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .fetch_one(&mut *self)
        .await?;

        Ok(payment)
    }

    async fn find_payment(&mut self, id: Uuid) -> AppResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;

        Ok(payment)
    }

    async fn find_payment_by_reservation(&mut self, reservation_id: Uuid) -> AppResult<Option<Payment>> {
        let payment =
            sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE reservation_id = $1")
                .bind(reservation_id)
                .fetch_optional(&mut *self)
                .await?;

        Ok(payment)
    }

    async fn transaction_id_exists(&mut self, transaction_id: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM payments WHERE transaction_id = $1)")
                .bind(transaction_id)
                .fetch_one(&mut *self)
                .await?;

        Ok(result.0)
    }

    async fn list_payments(&mut self) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY created_at DESC")
            .fetch_all(&mut *self)
            .await?;

        Ok(payments)
    }

    async fn update_payment(&mut self, payment: &Payment) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET amount = $2, payment_method = $3, transaction_id = $4, status = $5,
                payment_details = $6, payment_date = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.transaction_id)
        .bind(payment.status)
        .bind(&payment.payment_details)
        .bind(payment.payment_date)
        .bind(Utc::now())
        .fetch_optional(&mut *self)
        .await?
        .ok_or_else(|| not_found_error("Payment", payment.id))
    }

    async fn update_payment_status(&mut self, id: Uuid, status: PaymentStatus) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&mut *self)
        .await?
        .ok_or_else(|| not_found_error("Payment", id))
    }
}
