//! Gestor de reservas
//!
//! Ciclo de vida de una reserva y sincronización de `cars.is_available`.
//!
//! Reglas:
//! - Las fechas se normalizan a días completos: inicio a las 00:00 y fin al
//!   último instante del día.
//! - Dos reservas PENDING/CONFIRMED del mismo coche nunca comparten un instante.
//! - CONFIRMED marca el coche como no disponible; COMPLETED/CANCELLED lo
//!   liberan salvo que otra reserva activa siga reclamándolo.
//!
//! Todas las funciones reciben el instante actual (`now`) para que las reglas
//! de fechas sean deterministas en los tests.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::reservation_dto::CreateReservationRequest;
use crate::models::{
    auth::{AuthenticatedUser, Permission},
    notification::NotificationType,
    reservation::{start_of_day, DateRange, Reservation, ReservationStatus},
};
use crate::repositories::{CarStore, NotificationStore, ReservationStore, UserStore};
use crate::services::notification_service::notify;
use crate::utils::errors::{not_found_error, AppError, AppResult};

const RESERVATION_ENTITY: &str = "RESERVATION";

/// Horizonte usado al decidir si un coche sigue reclamado tras cerrar una reserva
const AVAILABILITY_HORIZON_DAYS: i64 = 365;

pub async fn create_reservation<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    request: CreateReservationRequest,
    now: DateTime<Utc>,
) -> AppResult<Reservation>
where
    S: CarStore + ReservationStore + UserStore + NotificationStore + ?Sized,
{
    let user_id = request.user_id.unwrap_or(actor.user_id);
    if user_id != actor.user_id {
        actor.require(Permission::ManageReservations)?;
    }

    if request.end_date <= request.start_date {
        return Err(AppError::InvalidRange(
            "End date must be after start date".to_string(),
        ));
    }
    let range = DateRange::whole_days(request.start_date, request.end_date)
        .ok_or_else(|| AppError::InvalidRange("End date is out of range".to_string()))?;
    if range.start < start_of_day(now.date_naive()) {
        return Err(AppError::InvalidRange(
            "Start date cannot be in the past".to_string(),
        ));
    }

    // El bloqueo serializa reservas concurrentes del mismo coche
    let car = store
        .lock_car(request.car_id)
        .await?
        .ok_or_else(|| not_found_error("Car", request.car_id))?;
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| not_found_error("User", user_id))?;

    if !car.is_available {
        return Err(AppError::Unavailable(format!(
            "{} is not available for reservation",
            car.display_name()
        )));
    }

    let overlapping = store
        .find_overlapping_reservations(car.id, range.start, range.end)
        .await?;
    if !overlapping.is_empty() {
        tracing::debug!(car_id = %car.id, conflicts = overlapping.len(), "Solapamiento detectado");
        return Err(AppError::ReservationConflict(
            "Car is already reserved for these dates".to_string(),
        ));
    }

    let total_price = match request.total_price {
        Some(price) if price <= Decimal::ZERO => {
            return Err(AppError::BadRequest(
                "Total price must be greater than zero".to_string(),
            ))
        }
        Some(price) => price,
        None => {
            let days = (request.end_date - request.start_date).num_days() + 1;
            car.price_per_day * Decimal::from(days)
        }
    };

    let reservation = Reservation::new(car.id, user.id, range, total_price, now);
    let reservation = store.insert_reservation(&reservation).await?;

    notify(
        store,
        user.id,
        NotificationType::ReservationCreated,
        "Reservation created",
        format!(
            "Your reservation for {} from {} to {} is pending confirmation",
            car.display_name(),
            request.start_date,
            request.end_date
        ),
        Some((reservation.id, RESERVATION_ENTITY)),
    )
    .await?;

    tracing::info!(
        reservation_id = %reservation.id,
        car_id = %car.id,
        user_id = %user.id,
        total = %reservation.total_price,
        "📅 Reserva creada"
    );
    Ok(reservation)
}

pub async fn get_reservation<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
) -> AppResult<Reservation>
where
    S: ReservationStore + ?Sized,
{
    let reservation = find_reservation(store, id).await?;
    actor.require_owner_or(reservation.user_id, Permission::ViewAllReservations)?;
    Ok(reservation)
}

pub async fn list_reservations<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
) -> AppResult<Vec<Reservation>>
where
    S: ReservationStore + ?Sized,
{
    actor.require(Permission::ViewAllReservations)?;
    store.list_reservations().await
}

pub async fn reservations_by_user<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    user_id: Uuid,
) -> AppResult<Vec<Reservation>>
where
    S: ReservationStore + ?Sized,
{
    actor.require_owner_or(user_id, Permission::ViewAllReservations)?;
    store.list_reservations_by_user(user_id).await
}

pub async fn reservations_by_car<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    car_id: Uuid,
) -> AppResult<Vec<Reservation>>
where
    S: ReservationStore + ?Sized,
{
    actor.require(Permission::ViewAllReservations)?;
    store.list_reservations_by_car(car_id).await
}

/// Transición administrativa de estado
pub async fn update_reservation_status<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    status: ReservationStatus,
    now: DateTime<Utc>,
) -> AppResult<Reservation>
where
    S: CarStore + ReservationStore + NotificationStore + ?Sized,
{
    actor.require(Permission::ManageReservations)?;
    let reservation = transition(store, id, status, now).await?;

    notify(
        store,
        reservation.user_id,
        NotificationType::ReservationUpdated,
        "Reservation updated",
        format!("Your reservation is now {}", status.as_str()),
        Some((reservation.id, RESERVATION_ENTITY)),
    )
    .await?;

    Ok(reservation)
}

/// Cambia el estado y aplica el efecto sobre la disponibilidad del coche.
/// No comprueba permisos: lo usan también los pagos.
pub(crate) async fn transition<S>(
    store: &mut S,
    id: Uuid,
    status: ReservationStatus,
    now: DateTime<Utc>,
) -> AppResult<Reservation>
where
    S: CarStore + ReservationStore + ?Sized,
{
    let current = find_reservation(store, id).await?;
    let updated = store.update_reservation_status(id, status, now).await?;

    match status {
        ReservationStatus::Confirmed => {
            store.set_car_availability(current.car_id, false).await?;
            tracing::info!(car_id = %current.car_id, "🔒 Coche reservado");
        }
        ReservationStatus::Completed | ReservationStatus::Cancelled => {
            release_if_unclaimed_within_horizon(store, current.car_id, id, now).await?;
        }
        ReservationStatus::Pending => {}
    }

    tracing::info!(
        reservation_id = %id,
        from = ?current.status,
        to = ?status,
        "🔄 Estado de reserva actualizado"
    );
    Ok(updated)
}

/// Cancelación por el dueño o por quien puede cancelar cualquier reserva
pub async fn cancel_reservation<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Reservation>
where
    S: CarStore + ReservationStore + NotificationStore + ?Sized,
{
    let reservation = find_reservation(store, id).await?;

    if reservation.user_id != actor.user_id && !actor.can(Permission::CancelAnyReservation) {
        tracing::warn!(reservation_id = %id, by = %actor.email, "Cancelación no autorizada");
        return Err(AppError::Forbidden(
            "You are not authorized to cancel this reservation".to_string(),
        ));
    }
    if !actor.can(Permission::CancelAnyReservation)
        && reservation.status != ReservationStatus::Pending
    {
        return Err(AppError::InvalidState(
            "Only pending reservations can be cancelled".to_string(),
        ));
    }
    if !reservation.status.is_active() {
        return Err(AppError::InvalidState(format!(
            "Reservation is already {}",
            reservation.status.as_str()
        )));
    }

    let cancelled = store
        .update_reservation_status(id, ReservationStatus::Cancelled, now)
        .await?;

    let still_claimed = store
        .find_active_reservations_for_car(reservation.car_id, now)
        .await?
        .iter()
        .any(|other| other.id != id);
    if !still_claimed {
        store.set_car_availability(reservation.car_id, true).await?;
        tracing::info!(car_id = %reservation.car_id, "🔓 Coche disponible de nuevo");
    }

    notify(
        store,
        reservation.user_id,
        NotificationType::ReservationCancelled,
        "Reservation cancelled",
        "Your reservation has been cancelled",
        Some((id, RESERVATION_ENTITY)),
    )
    .await?;

    tracing::info!(reservation_id = %id, by = %actor.email, "❌ Reserva cancelada");
    Ok(cancelled)
}

pub async fn delete_reservation<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<()>
where
    S: CarStore + ReservationStore + ?Sized,
{
    actor.require(Permission::ManageReservations)?;
    let reservation = find_reservation(store, id).await?;

    store.delete_reservation(id).await?;
    if reservation.status == ReservationStatus::Confirmed {
        release_if_unclaimed_within_horizon(store, reservation.car_id, id, now).await?;
    }

    tracing::info!(reservation_id = %id, "🗑️ Reserva eliminada");
    Ok(())
}

async fn find_reservation<S>(store: &mut S, id: Uuid) -> AppResult<Reservation>
where
    S: ReservationStore + ?Sized,
{
    store
        .find_reservation(id)
        .await?
        .ok_or_else(|| not_found_error("Reservation", id))
}

/// Libera el coche si ninguna otra reserva activa solapa `[now, now + horizonte]`
async fn release_if_unclaimed_within_horizon<S>(
    store: &mut S,
    car_id: Uuid,
    closed_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<()>
where
    S: CarStore + ReservationStore + ?Sized,
{
    let horizon = now + Duration::days(AVAILABILITY_HORIZON_DAYS);
    let still_claimed = store
        .find_overlapping_reservations(car_id, now, horizon)
        .await?
        .iter()
        .any(|other| other.id != closed_id);

    if still_claimed {
        tracing::debug!(car_id = %car_id, "Coche sigue reclamado por otra reserva");
    } else {
        store.set_car_availability(car_id, true).await?;
        tracing::info!(car_id = %car_id, "🔓 Coche disponible de nuevo");
    }
    Ok(())
}
