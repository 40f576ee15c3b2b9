use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::reservation_dto::{CreateReservationRequest, ReservationResponse};
use crate::dto::ApiResponse;
use crate::models::{
    auth::AuthenticatedUser,
    car::Car,
    reservation::{Reservation, ReservationStatus},
    user::User,
};
use crate::repositories::{CarStore, UserStore};
use crate::services::reservation_service;
use crate::utils::errors::AppResult;

/// Completa cada reserva con el coche y el email del usuario
async fn enrich(conn: &mut PgConnection, reservations: Vec<Reservation>) -> AppResult<Vec<ReservationResponse>> {
    let mut cars: HashMap<Uuid, Option<Car>> = HashMap::new();
    let mut users: HashMap<Uuid, Option<User>> = HashMap::new();
    let mut responses = Vec::with_capacity(reservations.len());

    for reservation in reservations {
        if !cars.contains_key(&reservation.car_id) {
            let car = conn.find_car(reservation.car_id).await?;
            cars.insert(reservation.car_id, car);
        }
        if !users.contains_key(&reservation.user_id) {
            let user = conn.find_user(reservation.user_id).await?;
            users.insert(reservation.user_id, user);
        }
        let car = cars.get(&reservation.car_id).and_then(Option::as_ref);
        let user = users.get(&reservation.user_id).and_then(Option::as_ref);
        responses.push(ReservationResponse::from_parts(reservation, car, user));
    }

    Ok(responses)
}

async fn enrich_one(conn: &mut PgConnection, reservation: Reservation) -> AppResult<ReservationResponse> {
    let car = conn.find_car(reservation.car_id).await?;
    let user = conn.find_user(reservation.user_id).await?;
    Ok(ReservationResponse::from_parts(reservation, car.as_ref(), user.as_ref()))
}

pub struct ReservationController {
    pool: PgPool,
}

impl ReservationController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateReservationRequest,
    ) -> AppResult<ApiResponse<ReservationResponse>> {
        let mut tx = self.pool.begin().await?;
        let reservation = reservation_service::create_reservation(&mut *tx, actor, request, Utc::now()).await?;
        let response = enrich_one(&mut tx, reservation).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(response, "Reservation created successfully"))
    }

    pub async fn list(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<ReservationResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let reservations = reservation_service::list_reservations(&mut *conn, actor).await?;
        Ok(ApiResponse::success(enrich(&mut conn, reservations).await?))
    }

    pub async fn get(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<ReservationResponse>> {
        let mut conn = self.pool.acquire().await?;
        let reservation = reservation_service::get_reservation(&mut *conn, actor, id).await?;
        Ok(ApiResponse::success(enrich_one(&mut conn, reservation).await?))
    }

    pub async fn mine(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<ReservationResponse>>> {
        self.by_user(actor, actor.user_id).await
    }

    pub async fn by_user(
        &self,
        actor: &AuthenticatedUser,
        user_id: Uuid,
    ) -> AppResult<ApiResponse<Vec<ReservationResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let reservations = reservation_service::reservations_by_user(&mut *conn, actor, user_id).await?;
        Ok(ApiResponse::success_with_message(
            enrich(&mut conn, reservations).await?,
            "User reservations retrieved successfully",
        ))
    }

    pub async fn by_car(
        &self,
        actor: &AuthenticatedUser,
        car_id: Uuid,
    ) -> AppResult<ApiResponse<Vec<ReservationResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let reservations = reservation_service::reservations_by_car(&mut *conn, actor, car_id).await?;
        Ok(ApiResponse::success_with_message(
            enrich(&mut conn, reservations).await?,
            "Car reservations retrieved successfully",
        ))
    }

    pub async fn update_status(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        status: ReservationStatus,
    ) -> AppResult<ApiResponse<ReservationResponse>> {
        let mut tx = self.pool.begin().await?;
        let reservation =
            reservation_service::update_reservation_status(&mut *tx, actor, id, status, Utc::now()).await?;
        let response = enrich_one(&mut tx, reservation).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(
            response,
            "Reservation status updated successfully",
        ))
    }

    pub async fn cancel(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<ReservationResponse>> {
        let mut tx = self.pool.begin().await?;
        let reservation = reservation_service::cancel_reservation(&mut *tx, actor, id, Utc::now()).await?;
        let response = enrich_one(&mut tx, reservation).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(response, "Reservation cancelled successfully"))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.pool.begin().await?;
        reservation_service::delete_reservation(&mut *tx, actor, id, Utc::now()).await?;
        tx.commit().await?;

        Ok(ApiResponse::message("Reservation deleted successfully"))
    }
}
