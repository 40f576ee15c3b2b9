use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::reservation::{Reservation, ReservationStatus};
use crate::repositories::ReservationStore;
use crate::utils::errors::{not_found_error, AppResult};

#[async_trait]
impl ReservationStore for PgConnection {
    async fn insert_reservation(&mut self, reservation: &Reservation) -> AppResult<Reservation> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (id, car_id, user_id, start_date, end_date, total_price,
                                      status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.car_id)
        .bind(reservation.user_id)
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .bind(reservation.total_price)
        .bind(reservation.status)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .fetch_one(&mut *self)
        .await?;

        Ok(reservation)
    }

    async fn find_reservation(&mut self, id: Uuid) -> AppResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;

        Ok(reservation)
    }

    async fn list_reservations(&mut self) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations ORDER BY created_at DESC",
        )
        .fetch_all(&mut *self)
        .await?;

        Ok(reservations)
    }

    async fn list_reservations_by_user(&mut self, user_id: Uuid) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY start_date DESC",
        )
        .bind(user_id)
        .fetch_all(&mut *self)
        .await?;

        Ok(reservations)
    }

    async fn list_reservations_by_car(&mut self, car_id: Uuid) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE car_id = $1 ORDER BY start_date",
        )
        .bind(car_id)
        .fetch_all(&mut *self)
        .await?;

        Ok(reservations)
    }

    async fn find_overlapping_reservations(
        &mut self,
        car_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE car_id = $1
              AND status IN ('PENDING', 'CONFIRMED')
              AND start_date <= $3
              AND end_date >= $2
            ORDER BY start_date
            "#,
        )
        .bind(car_id)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *self)
        .await?;

        Ok(reservations)
    }

    async fn find_active_reservations_for_car(
        &mut self,
        car_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE car_id = $1
              AND status IN ('PENDING', 'CONFIRMED')
              AND end_date > $2
            ORDER BY start_date
            "#,
        )
        .bind(car_id)
        .bind(now)
        .fetch_all(&mut *self)
        .await?;

        Ok(reservations)
    }

    async fn update_reservation_status(
        &mut self,
        id: Uuid,
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .fetch_optional(&mut *self)
        .await?
        .ok_or_else(|| not_found_error("Reservation", id))
    }

    async fn delete_reservation(&mut self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *self)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Reservation", id));
        }
        Ok(())
    }
}
