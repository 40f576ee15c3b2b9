use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::car::{Car, CarFilter, CarStats};
use crate::repositories::{CarStore, PageRequest};
use crate::utils::errors::{not_found_error, AppResult};

/// Añadir al builder los predicados de `CarFilter`
fn push_filter_predicates(builder: &mut QueryBuilder<'_, Postgres>, filter: &CarFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(make) = filter.make.as_deref().filter(|m| !m.trim().is_empty()) {
        builder
            .push(" AND LOWER(make) LIKE ")
            .push_bind(format!("%{}%", make.trim().to_lowercase()));
    }
    if let Some(model) = filter.model.as_deref().filter(|m| !m.trim().is_empty()) {
        builder
            .push(" AND LOWER(model) LIKE ")
            .push_bind(format!("%{}%", model.trim().to_lowercase()));
    }
    if let Some(year) = filter.year {
        builder.push(" AND year = ").push_bind(year);
    }
    if let Some(transmission) = filter.transmission {
        builder.push(" AND transmission = ").push_bind(transmission);
    }
    if let Some(min_price) = filter.min_price {
        builder.push(" AND price_per_day >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND price_per_day <= ").push_bind(max_price);
    }
    if filter.only_available.unwrap_or(false) {
        builder.push(" AND is_available = TRUE");
    }
}

#[async_trait]
impl CarStore for PgConnection {
    async fn insert_car(&mut self, car: &Car) -> AppResult<Car> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (id, make, model, year, color, transmission, drive_type,
                              fuel_efficiency, price_per_day, image_url, is_available,
                              created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(car.id)
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(&car.color)
        .bind(car.transmission)
        .bind(car.drive_type)
        .bind(car.fuel_efficiency)
        .bind(car.price_per_day)
        .bind(&car.image_url)
        .bind(car.is_available)
        .bind(car.created_at)
        .bind(car.updated_at)
        .fetch_one(&mut *self)
        .await?;

        Ok(car)
    }

    async fn find_car(&mut self, id: Uuid) -> AppResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;

        Ok(car)
    }

    async fn lock_car(&mut self, id: Uuid) -> AppResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;

        Ok(car)
    }

    async fn list_cars(&mut self) -> AppResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>("SELECT * FROM cars ORDER BY created_at DESC")
            .fetch_all(&mut *self)
            .await?;

        Ok(cars)
    }

    async fn list_available_cars(&mut self) -> AppResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE is_available = TRUE ORDER BY created_at DESC",
        )
        .fetch_all(&mut *self)
        .await?;

        Ok(cars)
    }

    async fn find_cars_by_make(&mut self, make: &str) -> AppResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE LOWER(make) = LOWER($1) ORDER BY model",
        )
        .bind(make.trim())
        .fetch_all(&mut *self)
        .await?;

        Ok(cars)
    }

    async fn find_cars_by_year_range(&mut self, from: i32, to: i32) -> AppResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE year BETWEEN $1 AND $2 ORDER BY year, make",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&mut *self)
        .await?;

        Ok(cars)
    }

    async fn find_cars_by_max_price(&mut self, max_price: Decimal) -> AppResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT * FROM cars WHERE price_per_day <= $1 ORDER BY price_per_day",
        )
        .bind(max_price)
        .fetch_all(&mut *self)
        .await?;

        Ok(cars)
    }

    async fn update_car(&mut self, car: &Car) -> AppResult<Car> {
        sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET make = $2, model = $3, year = $4, color = $5, transmission = $6,
                drive_type = $7, fuel_efficiency = $8, price_per_day = $9,
                image_url = $10, is_available = $11, updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(car.id)
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(&car.color)
        .bind(car.transmission)
        .bind(car.drive_type)
        .bind(car.fuel_efficiency)
        .bind(car.price_per_day)
        .bind(&car.image_url)
        .bind(car.is_available)
        .bind(Utc::now())
        .fetch_optional(&mut *self)
        .await?
        .ok_or_else(|| not_found_error("Car", car.id))
    }

    async fn set_car_availability(&mut self, id: Uuid, available: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE cars SET is_available = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(available)
            .bind(Utc::now())
            .execute(&mut *self)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Car", id));
        }
        Ok(())
    }

    async fn delete_car(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&mut *self)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn filter_cars(
        &mut self,
        filter: &CarFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Car>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cars");
        push_filter_predicates(&mut count_query, filter);
        let (total,): (i64,) = count_query.build_query_as().fetch_one(&mut *self).await?;

        let sort_by = filter.sort_by.unwrap_or_default();
        let direction = filter.sort_direction.unwrap_or_default();

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM cars");
        push_filter_predicates(&mut query, filter);
        // Columna y dirección vienen de enums cerrados, nunca del cliente
        query
            .push(" ORDER BY ")
            .push(sort_by.column())
            .push(" ")
            .push(direction.sql())
            .push(", id")
            .push(" LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let cars = query.build_query_as::<Car>().fetch_all(&mut *self).await?;

        Ok((cars, total))
    }

    async fn car_stats(&mut self) -> AppResult<CarStats> {
        let (total_cars, available_cars, average_price): (i64, i64, Option<Decimal>) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*),
                       COUNT(*) FILTER (WHERE is_available),
                       ROUND(AVG(price_per_day), 2)
                FROM cars
                "#,
            )
            .fetch_one(&mut *self)
            .await?;

        let (active_reservations, pending_reservations, total_revenue): (i64, i64, Option<Decimal>) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*) FILTER (WHERE status = 'CONFIRMED'),
                       COUNT(*) FILTER (WHERE status = 'PENDING'),
                       SUM(total_price) FILTER (WHERE status = 'COMPLETED')
                FROM reservations
                "#,
            )
            .fetch_one(&mut *self)
            .await?;

        Ok(CarStats {
            total_cars,
            available_cars,
            active_reservations,
            average_price,
            pending_reservations,
            total_revenue: total_revenue.unwrap_or(Decimal::ZERO),
        })
    }

    async fn cars_rented_by_user(&mut self, user_id: Uuid) -> AppResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT DISTINCT c.*
            FROM cars c
            JOIN reservations r ON r.car_id = c.id
            WHERE r.user_id = $1 AND r.status IN ('PENDING', 'CONFIRMED')
            ORDER BY c.make, c.model
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self)
        .await?;

        Ok(cars)
    }
}
