use axum::extract::Multipart;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::car_dto::{CarRequest, CarResponse, CarSearchQuery};
use crate::dto::{ApiResponse, PageResponse};
use crate::models::auth::{AuthenticatedUser, Permission};
use crate::models::car::{Car, CarStats};
use crate::services::{car_service, FileStorage};
use crate::utils::errors::{AppError, AppResult};

fn responses(cars: Vec<Car>) -> Vec<CarResponse> {
    cars.into_iter().map(CarResponse::from).collect()
}

/// Primer campo `file` de un formulario multipart: (nombre, content-type, bytes)
pub async fn read_file_field(multipart: &mut Multipart) -> AppResult<(String, Option<String>, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("File name is required".to_string()))?;
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("No file provided or file is empty".to_string()));
        }
        return Ok((filename, content_type, bytes.to_vec()));
    }

    Err(AppError::BadRequest("No file provided or file is empty".to_string()))
}

pub struct CarController {
    pool: PgPool,
}

impl CarController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, actor: &AuthenticatedUser, request: CarRequest) -> AppResult<ApiResponse<CarResponse>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let car = car_service::create_car(&mut *tx, actor, request).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(car.into(), "Car created successfully"))
    }

    pub async fn list(&self) -> AppResult<ApiResponse<Vec<CarResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let cars = car_service::list_cars(&mut *conn).await?;
        Ok(ApiResponse::success(responses(cars)))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<CarResponse>> {
        let mut conn = self.pool.acquire().await?;
        let car = car_service::get_car(&mut *conn, id).await?;
        Ok(ApiResponse::success(car.into()))
    }

    pub async fn available(&self) -> AppResult<ApiResponse<Vec<CarResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let cars = car_service::available_cars(&mut *conn).await?;
        Ok(ApiResponse::success(responses(cars)))
    }

    pub async fn by_make(&self, make: &str) -> AppResult<ApiResponse<Vec<CarResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let cars = car_service::cars_by_make(&mut *conn, make).await?;
        Ok(ApiResponse::success(responses(cars)))
    }

    pub async fn by_year_range(&self, start_year: i32, end_year: i32) -> AppResult<ApiResponse<Vec<CarResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let cars = car_service::cars_by_year_range(&mut *conn, start_year, end_year).await?;
        Ok(ApiResponse::success(responses(cars)))
    }

    pub async fn by_max_price(&self, max_price: Decimal) -> AppResult<ApiResponse<Vec<CarResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let cars = car_service::cars_by_max_price(&mut *conn, max_price).await?;
        Ok(ApiResponse::success(responses(cars)))
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: CarRequest,
    ) -> AppResult<ApiResponse<CarResponse>> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let car = car_service::update_car(&mut *tx, actor, id, request).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(car.into(), "Car updated successfully"))
    }

    pub async fn update_availability(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        is_available: bool,
    ) -> AppResult<ApiResponse<CarResponse>> {
        let mut tx = self.pool.begin().await?;
        let car = car_service::update_availability(&mut *tx, actor, id, is_available).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(car.into(), "Car availability updated"))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.pool.begin().await?;
        car_service::delete_car(&mut *tx, actor, id).await?;
        tx.commit().await?;

        Ok(ApiResponse::message("Car deleted successfully"))
    }

    pub async fn stats(&self) -> AppResult<ApiResponse<CarStats>> {
        let mut conn = self.pool.acquire().await?;
        Ok(ApiResponse::success(car_service::stats(&mut *conn).await?))
    }

    pub async fn search(&self, query: CarSearchQuery) -> AppResult<ApiResponse<PageResponse<CarResponse>>> {
        let (filter, page) = query.into_parts();
        let mut conn = self.pool.acquire().await?;
        let (cars, total) = car_service::search_cars(&mut *conn, &filter, page).await?;

        Ok(ApiResponse::success(PageResponse::new(
            responses(cars),
            page.page,
            page.size,
            total,
        )))
    }

    pub async fn rented(&self, actor: &AuthenticatedUser) -> AppResult<ApiResponse<Vec<CarResponse>>> {
        let mut conn = self.pool.acquire().await?;
        let cars = car_service::rented_cars(&mut *conn, actor).await?;
        Ok(ApiResponse::success(responses(cars)))
    }

    /// Guarda la imagen en disco y devuelve su URL `/cars/...`
    pub async fn upload_image(
        &self,
        actor: &AuthenticatedUser,
        storage: &FileStorage,
        mut multipart: Multipart,
    ) -> AppResult<ApiResponse<String>> {
        actor.require(Permission::ManageCars)?;
        let (filename, _, bytes) = read_file_field(&mut multipart).await?;
        let url = storage.store(&filename, &bytes).await?;

        Ok(ApiResponse::success_with_message(url, "Image uploaded successfully"))
    }

    /// Sube la imagen y la asigna al coche
    pub async fn upload_car_image(
        &self,
        actor: &AuthenticatedUser,
        storage: &FileStorage,
        id: Uuid,
        mut multipart: Multipart,
    ) -> AppResult<ApiResponse<CarResponse>> {
        actor.require(Permission::ManageCars)?;
        let (filename, _, bytes) = read_file_field(&mut multipart).await?;

        let mut tx = self.pool.begin().await?;
        car_service::get_car(&mut *tx, id).await?;
        let url = storage.store(&filename, &bytes).await?;
        let car = car_service::set_image(&mut *tx, actor, id, url).await?;
        tx.commit().await?;

        Ok(ApiResponse::success_with_message(car.into(), "Image uploaded successfully"))
    }
}
