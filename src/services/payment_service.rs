//! Registro de pagos (sin pasarela real)
//!
//! Un pago por reserva. Completar un pago confirma la reserva; un fallo o un
//! reembolso la cancela.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::payment_dto::CreatePaymentRequest;
use crate::models::{
    auth::{AuthenticatedUser, Permission},
    notification::NotificationType,
    payment::{generate_transaction_id, Payment, PaymentStatus, PENDING_PAYMENT_METHOD},
    reservation::{Reservation, ReservationStatus},
};
use crate::repositories::{CarStore, NotificationStore, PaymentStore, ReservationStore};
use crate::services::{notification_service::notify, reservation_service};
use crate::utils::errors::{not_found_error, AppError, AppResult};

const PAYMENT_ENTITY: &str = "PAYMENT";

async fn owned_reservation<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    reservation_id: Uuid,
) -> AppResult<Reservation>
where
    S: ReservationStore + ?Sized,
{
    let reservation = store
        .find_reservation(reservation_id)
        .await?
        .ok_or_else(|| not_found_error("Reservation", reservation_id))?;
    actor.require_owner_or(reservation.user_id, Permission::ManagePayments)?;
    Ok(reservation)
}

/// Pago directo: la pasarela ya cobró y se registra como COMPLETED
pub async fn create_payment<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    request: CreatePaymentRequest,
    now: DateTime<Utc>,
) -> AppResult<Payment>
where
    S: CarStore + ReservationStore + PaymentStore + NotificationStore + ?Sized,
{
    let reservation = owned_reservation(store, actor, request.reservation_id).await?;

    if store.transaction_id_exists(&request.transaction_id).await? {
        return Err(AppError::DuplicateTransaction(format!(
            "Transaction {} has already been processed",
            request.transaction_id
        )));
    }
    if request.amount != reservation.total_price {
        return Err(AppError::AmountMismatch(format!(
            "Payment amount {} does not match reservation total {}",
            request.amount, reservation.total_price
        )));
    }
    if !reservation.status.is_active() {
        return Err(AppError::InvalidState(format!(
            "Cannot pay a {} reservation",
            reservation.status.as_str()
        )));
    }

    let payment = match store.find_payment_by_reservation(reservation.id).await? {
        Some(existing) if existing.status == PaymentStatus::Completed => {
            return Err(AppError::Conflict(
                "Reservation has already been paid".to_string(),
            ));
        }
        // Un pago iniciado se completa en lugar de duplicarse
        Some(existing) => {
            store
                .update_payment(&Payment {
                    amount: request.amount,
                    payment_method: request.payment_method,
                    transaction_id: request.transaction_id,
                    status: PaymentStatus::Completed,
                    payment_details: request.payment_details,
                    payment_date: now,
                    ..existing
                })
                .await?
        }
        None => {
            let payment = Payment::new(
                reservation.id,
                request.amount,
                request.payment_method,
                request.transaction_id,
                PaymentStatus::Completed,
                request.payment_details,
                now,
            );
            store.insert_payment(&payment).await?
        }
    };

    reservation_service::transition(store, reservation.id, ReservationStatus::Confirmed, now)
        .await?;
    notify_payment(store, &reservation, &payment).await?;

    tracing::info!(
        payment_id = %payment.id,
        reservation_id = %reservation.id,
        amount = %payment.amount,
        "💳 Pago completado"
    );
    Ok(payment)
}

/// Idempotente: devuelve el pago existente o crea uno PENDING
pub async fn initiate_payment<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    reservation_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Payment>
where
    S: ReservationStore + PaymentStore + ?Sized,
{
    let reservation = owned_reservation(store, actor, reservation_id).await?;

    if let Some(existing) = store.find_payment_by_reservation(reservation.id).await? {
        return Ok(existing);
    }

    let payment = Payment::new(
        reservation.id,
        reservation.total_price,
        PENDING_PAYMENT_METHOD.to_string(),
        generate_transaction_id(),
        PaymentStatus::Pending,
        None,
        now,
    );
    let payment = store.insert_payment(&payment).await?;
    tracing::info!(payment_id = %payment.id, reservation_id = %reservation.id, "Pago iniciado");
    Ok(payment)
}

pub async fn get_payment<S>(store: &mut S, actor: &AuthenticatedUser, id: Uuid) -> AppResult<Payment>
where
    S: ReservationStore + PaymentStore + ?Sized,
{
    let payment = store
        .find_payment(id)
        .await?
        .ok_or_else(|| not_found_error("Payment", id))?;
    owned_reservation(store, actor, payment.reservation_id).await?;
    Ok(payment)
}

pub async fn get_payment_by_reservation<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    reservation_id: Uuid,
) -> AppResult<Payment>
where
    S: ReservationStore + PaymentStore + ?Sized,
{
    owned_reservation(store, actor, reservation_id).await?;
    store
        .find_payment_by_reservation(reservation_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Payment not found for reservation: {}", reservation_id))
        })
}

pub async fn list_payments<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<Vec<Payment>>
where
    S: PaymentStore + ?Sized,
{
    actor.require(Permission::ManagePayments)?;
    store.list_payments().await
}

/// COMPLETED confirma la reserva; FAILED y REFUNDED la cancelan
pub async fn update_payment_status<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    status: PaymentStatus,
    now: DateTime<Utc>,
) -> AppResult<Payment>
where
    S: CarStore + ReservationStore + PaymentStore + NotificationStore + ?Sized,
{
    actor.require(Permission::ManagePayments)?;

    let current = store
        .find_payment(id)
        .await?
        .ok_or_else(|| not_found_error("Payment", id))?;
    let payment = store.update_payment_status(id, status).await?;

    let reservation_status = match status {
        PaymentStatus::Completed => Some(ReservationStatus::Confirmed),
        PaymentStatus::Failed | PaymentStatus::Refunded => Some(ReservationStatus::Cancelled),
        PaymentStatus::Pending => None,
    };
    if let Some(reservation_status) = reservation_status {
        let reservation =
            reservation_service::transition(store, payment.reservation_id, reservation_status, now)
                .await?;
        notify_payment(store, &reservation, &payment).await?;
    }

    tracing::info!(
        payment_id = %id,
        from = ?current.status,
        to = ?status,
        "💳 Estado de pago actualizado"
    );
    Ok(payment)
}

async fn notify_payment<S>(store: &mut S, reservation: &Reservation, payment: &Payment) -> AppResult<()>
where
    S: NotificationStore + ?Sized,
{
    let (kind, title, message) = match payment.status {
        PaymentStatus::Completed => (
            NotificationType::PaymentCompleted,
            "Payment completed",
            format!("Payment of {} received, your reservation is confirmed", payment.amount),
        ),
        PaymentStatus::Failed => (
            NotificationType::PaymentFailed,
            "Payment failed",
            "Your payment failed and the reservation was cancelled".to_string(),
        ),
        PaymentStatus::Refunded => (
            NotificationType::System,
            "Payment refunded",
            format!("Payment of {} has been refunded", payment.amount),
        ),
        PaymentStatus::Pending => return Ok(()),
    };

    notify(
        store,
        reservation.user_id,
        kind,
        title,
        message,
        Some((payment.id, PAYMENT_ENTITY)),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::models::auth::Role;
    use crate::repositories::memory::MemoryStore;
    use crate::services::reservation_service::{
        create_reservation,
        tests::{day, now, request, seed_car, seed_user},
    };

    async fn setup(store: &mut MemoryStore) -> (AuthenticatedUser, Reservation, Uuid) {
        let user = seed_user(store, Role::User);
        let car_id = seed_car(store);
        let reservation = create_reservation(
            store,
            &user,
            request(car_id, day(2030, 1, 1), day(2030, 1, 5)),
            now(),
        )
        .await
        .unwrap();
        (user, reservation, car_id)
    }

    fn payment_request(reservation: &Reservation, txn: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            reservation_id: reservation.id,
            amount: reservation.total_price,
            payment_method: "CARD".to_string(),
            transaction_id: txn.to_string(),
            payment_details: None,
        }
    }

    #[tokio::test]
    async fn test_initiate_payment_is_idempotent() {
        let mut store = MemoryStore::new();
        let (user, reservation, _) = setup(&mut store).await;

        let first = initiate_payment(&mut store, &user, reservation.id, now()).await.unwrap();
        let second = initiate_payment(&mut store, &user, reservation.id, now()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.transaction_id, second.transaction_id);
        assert_eq!(first.status, PaymentStatus::Pending);
        assert_eq!(first.payment_method, PENDING_PAYMENT_METHOD);
        assert_eq!(first.amount, reservation.total_price);
        assert!(first.transaction_id.starts_with("TXN-"));
        assert_eq!(store.payments.len(), 1);
    }

    #[tokio::test]
    async fn test_create_payment_confirms_reservation() {
        let mut store = MemoryStore::new();
        let (user, reservation, car_id) = setup(&mut store).await;

        let payment = create_payment(&mut store, &user, payment_request(&reservation, "T-1"), now())
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(store.reservation(reservation.id).status, ReservationStatus::Confirmed);
        assert!(!store.car(car_id).is_available);
        assert_eq!(
            store.notifications_of(user.user_id, NotificationType::PaymentCompleted),
            1
        );
    }

    #[tokio::test]
    async fn test_create_payment_completes_initiated_payment() {
        let mut store = MemoryStore::new();
        let (user, reservation, _) = setup(&mut store).await;
        let initiated = initiate_payment(&mut store, &user, reservation.id, now()).await.unwrap();

        let payment = create_payment(&mut store, &user, payment_request(&reservation, "T-9"), now())
            .await
            .unwrap();
        assert_eq!(payment.id, initiated.id);
        assert_eq!(payment.transaction_id, "T-9");
        assert_eq!(store.payments.len(), 1);
    }

    #[tokio::test]
    async fn test_amount_mismatch() {
        let mut store = MemoryStore::new();
        let (user, reservation, _) = setup(&mut store).await;

        let mut req = payment_request(&reservation, "T-1");
        req.amount += Decimal::ONE;
        let result = create_payment(&mut store, &user, req, now()).await;
        assert!(matches!(result, Err(AppError::AmountMismatch(_))));
        assert_eq!(store.reservation(reservation.id).status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn test_duplicate_transaction_id() {
        let mut store = MemoryStore::new();
        let (user, first, _) = setup(&mut store).await;
        let car_id = seed_car(&mut store);
        let second = create_reservation(
            &mut store,
            &user,
            request(car_id, day(2030, 3, 1), day(2030, 3, 2)),
            now(),
        )
        .await
        .unwrap();

        create_payment(&mut store, &user, payment_request(&first, "DUP"), now())
            .await
            .unwrap();
        let result = create_payment(&mut store, &user, payment_request(&second, "DUP"), now()).await;
        assert!(matches!(result, Err(AppError::DuplicateTransaction(_))));
    }

    #[tokio::test]
    async fn test_paying_twice_is_conflict() {
        let mut store = MemoryStore::new();
        let (user, reservation, _) = setup(&mut store).await;

        create_payment(&mut store, &user, payment_request(&reservation, "T-1"), now())
            .await
            .unwrap();
        let result = create_payment(&mut store, &user, payment_request(&reservation, "T-2"), now()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_stranger_cannot_pay_or_read() {
        let mut store = MemoryStore::new();
        let (_, reservation, _) = setup(&mut store).await;
        let stranger = seed_user(&mut store, Role::User);

        assert!(matches!(
            initiate_payment(&mut store, &stranger, reservation.id, now()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            get_payment_by_reservation(&mut store, &stranger, reservation.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_payment_cancels_reservation() {
        let mut store = MemoryStore::new();
        let (user, reservation, car_id) = setup(&mut store).await;
        let admin = seed_user(&mut store, Role::Admin);
        let payment = initiate_payment(&mut store, &user, reservation.id, now()).await.unwrap();

        assert!(update_payment_status(&mut store, &user, payment.id, PaymentStatus::Failed, now())
            .await
            .is_err());

        update_payment_status(&mut store, &admin, payment.id, PaymentStatus::Completed, now())
            .await
            .unwrap();
        assert!(!store.car(car_id).is_available);

        update_payment_status(&mut store, &admin, payment.id, PaymentStatus::Failed, now())
            .await
            .unwrap();
        assert_eq!(store.reservation(reservation.id).status, ReservationStatus::Cancelled);
        assert!(store.car(car_id).is_available);
        assert_eq!(
            store.notifications_of(user.user_id, NotificationType::PaymentFailed),
            1
        );
    }

    #[tokio::test]
    async fn test_refund_cancels_confirmed_reservation_and_frees_car() {
        let mut store = MemoryStore::new();
        let (user, reservation, car_id) = setup(&mut store).await;
        let admin = seed_user(&mut store, Role::Admin);

        let payment = create_payment(&mut store, &user, payment_request(&reservation, "T-R"), now())
            .await
            .unwrap();
        assert_eq!(store.reservation(reservation.id).status, ReservationStatus::Confirmed);
        assert!(!store.car(car_id).is_available);

        let refunded = update_payment_status(&mut store, &admin, payment.id, PaymentStatus::Refunded, now())
            .await
            .unwrap();
        assert_eq!(refunded.status, PaymentStatus::Refunded);
        assert_eq!(store.reservation(reservation.id).status, ReservationStatus::Cancelled);
        assert!(store.car(car_id).is_available);
        assert_eq!(store.notifications_of(user.user_id, NotificationType::System), 1);
    }
}
