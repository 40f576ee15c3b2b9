//! Almacén en memoria con la misma semántica que las consultas SQL.
//! Solo se compila para los tests de servicios.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    auth::Role,
    car::{Car, CarFilter, CarSortKey, CarStats, SortDirection},
    notification::{Notification, NotificationType},
    payment::{Payment, PaymentStatus},
    reservation::{DateRange, Reservation, ReservationStatus},
    user::User,
};
use crate::repositories::{
    CarStore, NotificationStore, PageRequest, PaymentStore, ReservationStore, UserStore,
};
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub cars: HashMap<Uuid, Car>,
    pub reservations: HashMap<Uuid, Reservation>,
    pub users: HashMap<Uuid, User>,
    pub payments: HashMap<Uuid, Payment>,
    pub notifications: Vec<Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn car(&self, id: Uuid) -> &Car {
        &self.cars[&id]
    }

    pub fn reservation(&self, id: Uuid) -> &Reservation {
        &self.reservations[&id]
    }

    pub fn notifications_of(&self, user_id: Uuid, kind: NotificationType) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.notification_type == kind)
            .count()
    }
}

fn newest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

fn matches_filter(car: &Car, filter: &CarFilter) -> bool {
    let contains = |field: &str, needle: &Option<String>| match needle.as_deref() {
        Some(n) if !n.trim().is_empty() => field.to_lowercase().contains(&n.trim().to_lowercase()),
        _ => true,
    };

    contains(&car.make, &filter.make)
        && contains(&car.model, &filter.model)
        && filter.year.map_or(true, |y| car.year == y)
        && filter.transmission.map_or(true, |t| car.transmission == t)
        && filter.min_price.map_or(true, |p| car.price_per_day >= p)
        && filter.max_price.map_or(true, |p| car.price_per_day <= p)
        && (!filter.only_available.unwrap_or(false) || car.is_available)
}

#[async_trait]
impl CarStore for MemoryStore {
    async fn insert_car(&mut self, car: &Car) -> AppResult<Car> {
        self.cars.insert(car.id, car.clone());
        Ok(car.clone())
    }

    async fn find_car(&mut self, id: Uuid) -> AppResult<Option<Car>> {
        Ok(self.cars.get(&id).cloned())
    }

    async fn lock_car(&mut self, id: Uuid) -> AppResult<Option<Car>> {
        Ok(self.cars.get(&id).cloned())
    }

    async fn list_cars(&mut self) -> AppResult<Vec<Car>> {
        Ok(newest_first(self.cars.values().cloned().collect(), |c| c.created_at))
    }

    async fn list_available_cars(&mut self) -> AppResult<Vec<Car>> {
        let cars = self.cars.values().filter(|c| c.is_available).cloned().collect();
        Ok(newest_first(cars, |c| c.created_at))
    }

    async fn find_cars_by_make(&mut self, make: &str) -> AppResult<Vec<Car>> {
        let mut cars: Vec<Car> = self
            .cars
            .values()
            .filter(|c| c.make.eq_ignore_ascii_case(make.trim()))
            .cloned()
            .collect();
        cars.sort_by(|a, b| a.model.cmp(&b.model));
        Ok(cars)
    }

    async fn find_cars_by_year_range(&mut self, from: i32, to: i32) -> AppResult<Vec<Car>> {
        let mut cars: Vec<Car> = self
            .cars
            .values()
            .filter(|c| (from..=to).contains(&c.year))
            .cloned()
            .collect();
        cars.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.make.cmp(&b.make)));
        Ok(cars)
    }

    async fn find_cars_by_max_price(&mut self, max_price: Decimal) -> AppResult<Vec<Car>> {
        let mut cars: Vec<Car> = self
            .cars
            .values()
            .filter(|c| c.price_per_day <= max_price)
            .cloned()
            .collect();
        cars.sort_by_key(|c| c.price_per_day);
        Ok(cars)
    }

    async fn update_car(&mut self, car: &Car) -> AppResult<Car> {
        let stored = self
            .cars
            .get_mut(&car.id)
            .ok_or_else(|| not_found_error("Car", car.id))?;
        *stored = Car {
            updated_at: Utc::now(),
            ..car.clone()
        };
        Ok(stored.clone())
    }

    async fn set_car_availability(&mut self, id: Uuid, available: bool) -> AppResult<()> {
        let car = self.cars.get_mut(&id).ok_or_else(|| not_found_error("Car", id))?;
        car.is_available = available;
        Ok(())
    }

    async fn delete_car(&mut self, id: Uuid) -> AppResult<bool> {
        if self.cars.remove(&id).is_none() {
            return Ok(false);
        }
        let removed: Vec<Uuid> = self
            .reservations
            .values()
            .filter(|r| r.car_id == id)
            .map(|r| r.id)
            .collect();
        for reservation_id in removed {
            self.reservations.remove(&reservation_id);
            self.payments.retain(|_, p| p.reservation_id != reservation_id);
        }
        Ok(true)
    }

    async fn filter_cars(
        &mut self,
        filter: &CarFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Car>, i64)> {
        let mut cars: Vec<Car> = self
            .cars
            .values()
            .filter(|c| matches_filter(c, filter))
            .cloned()
            .collect();

        let sort_by = filter.sort_by.unwrap_or_default();
        cars.sort_by(|a, b| {
            let ordering = match sort_by {
                CarSortKey::Make => a.make.cmp(&b.make),
                CarSortKey::Model => a.model.cmp(&b.model),
                CarSortKey::Year => a.year.cmp(&b.year),
                CarSortKey::PricePerDay => a.price_per_day.cmp(&b.price_per_day),
                CarSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let ordering = ordering.then_with(|| a.id.cmp(&b.id));
            match filter.sort_direction.unwrap_or_default() {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = cars.len() as i64;
        let content = cars
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();
        Ok((content, total))
    }

    async fn car_stats(&mut self) -> AppResult<CarStats> {
        let total_cars = self.cars.len() as i64;
        let available_cars = self.cars.values().filter(|c| c.is_available).count() as i64;
        let average_price = if total_cars == 0 {
            None
        } else {
            let sum: Decimal = self.cars.values().map(|c| c.price_per_day).sum();
            Some((sum / Decimal::from(total_cars)).round_dp(2))
        };
        let count = |status: ReservationStatus| {
            self.reservations.values().filter(|r| r.status == status).count() as i64
        };

        Ok(CarStats {
            total_cars,
            available_cars,
            active_reservations: count(ReservationStatus::Confirmed),
            average_price,
            pending_reservations: count(ReservationStatus::Pending),
            total_revenue: self
                .reservations
                .values()
                .filter(|r| r.status == ReservationStatus::Completed)
                .map(|r| r.total_price)
                .sum(),
        })
    }

    async fn cars_rented_by_user(&mut self, user_id: Uuid) -> AppResult<Vec<Car>> {
        let mut ids: Vec<Uuid> = self
            .reservations
            .values()
            .filter(|r| r.user_id == user_id && r.status.is_active())
            .map(|r| r.car_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids.iter().filter_map(|id| self.cars.get(id).cloned()).collect())
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn insert_reservation(&mut self, reservation: &Reservation) -> AppResult<Reservation> {
        self.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation.clone())
    }

    async fn find_reservation(&mut self, id: Uuid) -> AppResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).cloned())
    }

    async fn list_reservations(&mut self) -> AppResult<Vec<Reservation>> {
        Ok(newest_first(self.reservations.values().cloned().collect(), |r| r.created_at))
    }

    async fn list_reservations_by_user(&mut self, user_id: Uuid) -> AppResult<Vec<Reservation>> {
        let items = self
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |r| r.start_date))
    }

    async fn list_reservations_by_car(&mut self, car_id: Uuid) -> AppResult<Vec<Reservation>> {
        let mut items: Vec<Reservation> = self
            .reservations
            .values()
            .filter(|r| r.car_id == car_id)
            .cloned()
            .collect();
        items.sort_by_key(|r| r.start_date);
        Ok(items)
    }

    async fn find_overlapping_reservations(
        &mut self,
        car_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        let window = DateRange::new(start, end);
        Ok(self
            .reservations
            .values()
            .filter(|r| r.car_id == car_id && r.status.is_active() && r.range().overlaps(&window))
            .cloned()
            .collect())
    }

    async fn find_active_reservations_for_car(
        &mut self,
        car_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .values()
            .filter(|r| r.car_id == car_id && r.status.is_active() && r.end_date > now)
            .cloned()
            .collect())
    }

    async fn update_reservation_status(
        &mut self,
        id: Uuid,
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        let reservation = self
            .reservations
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Reservation", id))?;
        reservation.status = status;
        reservation.updated_at = now;
        Ok(reservation.clone())
    }

    async fn delete_reservation(&mut self, id: Uuid) -> AppResult<()> {
        self.reservations
            .remove(&id)
            .ok_or_else(|| not_found_error("Reservation", id))?;
        self.payments.retain(|_, p| p.reservation_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&mut self, user: &User) -> AppResult<User> {
        self.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_user(&mut self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn email_exists(&mut self, email: &str) -> AppResult<bool> {
        Ok(self.find_user_by_email(email).await?.is_some())
    }

    async fn list_users(&mut self) -> AppResult<Vec<User>> {
        Ok(newest_first(self.users.values().cloned().collect(), |u| u.created_at))
    }

    async fn update_user_profile(
        &mut self,
        id: Uuid,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        profile_image: Option<&str>,
    ) -> AppResult<User> {
        let user = self.users.get_mut(&id).ok_or_else(|| not_found_error("User", id))?;
        user.email = email.to_string();
        user.first_name = first_name.map(str::to_string);
        user.last_name = last_name.map(str::to_string);
        user.profile_image = profile_image.map(str::to_string);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_user_role(&mut self, id: Uuid, role: Role) -> AppResult<User> {
        let user = self.users.get_mut(&id).ok_or_else(|| not_found_error("User", id))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn delete_user(&mut self, id: Uuid) -> AppResult<bool> {
        if self.users.remove(&id).is_none() {
            return Ok(false);
        }
        self.reservations.retain(|_, r| r.user_id != id);
        self.notifications.retain(|n| n.user_id != id);
        Ok(true)
    }

    async fn set_totp_state(
        &mut self,
        id: Uuid,
        secret: Option<&str>,
        enabled: bool,
        verified: bool,
    ) -> AppResult<()> {
        let user = self.users.get_mut(&id).ok_or_else(|| not_found_error("User", id))?;
        user.totp_secret = secret.map(str::to_string);
        user.totp_enabled = enabled;
        user.totp_verified = verified;
        Ok(())
    }

    async fn set_reset_token(
        &mut self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(user) = self.users.get_mut(&id) {
            user.reset_password_token = Some(token.to_string());
            user.reset_password_expiry = Some(expires_at);
        }
        Ok(())
    }

    async fn find_user_by_reset_token(&mut self, token: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .values()
            .find(|u| u.reset_password_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_password(&mut self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let user = self.users.get_mut(&id).ok_or_else(|| not_found_error("User", id))?;
        user.password_hash = password_hash.to_string();
        user.reset_password_token = None;
        user.reset_password_expiry = None;
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert_payment(&mut self, payment: &Payment) -> AppResult<Payment> {
        self.payments.insert(payment.id, payment.clone());
        Ok(payment.clone())
    }

    async fn find_payment(&mut self, id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self.payments.get(&id).cloned())
    }

    async fn find_payment_by_reservation(&mut self, reservation_id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self
            .payments
            .values()
            .find(|p| p.reservation_id == reservation_id)
            .cloned())
    }

    async fn transaction_id_exists(&mut self, transaction_id: &str) -> AppResult<bool> {
        Ok(self.payments.values().any(|p| p.transaction_id == transaction_id))
    }

    async fn list_payments(&mut self) -> AppResult<Vec<Payment>> {
        Ok(newest_first(self.payments.values().cloned().collect(), |p| p.created_at))
    }

    async fn update_payment(&mut self, payment: &Payment) -> AppResult<Payment> {
        let stored = self
            .payments
            .get_mut(&payment.id)
            .ok_or_else(|| not_found_error("Payment", payment.id))?;
        *stored = payment.clone();
        Ok(stored.clone())
    }

    async fn update_payment_status(&mut self, id: Uuid, status: PaymentStatus) -> AppResult<Payment> {
        let payment = self
            .payments
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Payment", id))?;
        payment.status = status;
        Ok(payment.clone())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&mut self, notification: &Notification) -> AppResult<Notification> {
        self.notifications.push(notification.clone());
        Ok(notification.clone())
    }

    async fn find_notification(&mut self, id: Uuid) -> AppResult<Option<Notification>> {
        Ok(self.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn list_all_notifications(&mut self) -> AppResult<Vec<Notification>> {
        Ok(newest_first(self.notifications.clone(), |n| n.created_at))
    }

    async fn list_notifications_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let items = self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |n| n.created_at))
    }

    async fn list_notifications_by_type(
        &mut self,
        kind: NotificationType,
    ) -> AppResult<Vec<Notification>> {
        let items = self
            .notifications
            .iter()
            .filter(|n| n.notification_type == kind)
            .cloned()
            .collect();
        Ok(newest_first(items, |n| n.created_at))
    }

    async fn mark_notification_read(&mut self, id: Uuid) -> AppResult<()> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| not_found_error("Notification", id))?;
        notification.read = true;
        Ok(())
    }

    async fn mark_all_notifications_read(&mut self, user_id: Uuid) -> AppResult<u64> {
        let mut updated = 0;
        for n in self.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.read) {
            n.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_notification(&mut self, id: Uuid) -> AppResult<()> {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        if self.notifications.len() == before {
            return Err(not_found_error("Notification", id));
        }
        Ok(())
    }

    async fn clear_notifications(&mut self) -> AppResult<u64> {
        let removed = self.notifications.len() as u64;
        self.notifications.clear();
        Ok(removed)
    }

    async fn count_unread_notifications(&mut self, user_id: Option<Uuid>) -> AppResult<i64> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| !n.read && user_id.map_or(true, |id| n.user_id == id))
            .count() as i64)
    }
}
