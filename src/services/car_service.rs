//! Catálogo de coches

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::car_dto::CarRequest;
use crate::models::{
    auth::{AuthenticatedUser, Permission},
    car::{Car, CarFilter, CarStats},
};
use crate::repositories::{CarStore, PageRequest};
use crate::utils::errors::{not_found_error, AppError, AppResult};

fn ensure_positive_price(price: Decimal) -> AppResult<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Price per day must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_car<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    request: CarRequest,
) -> AppResult<Car>
where
    S: CarStore + ?Sized,
{
    actor.require(Permission::ManageCars)?;
    ensure_positive_price(request.price_per_day)?;

    let now = Utc::now();
    let car = Car {
        id: Uuid::new_v4(),
        make: request.make.trim().to_string(),
        model: request.model.trim().to_string(),
        year: request.year,
        color: request.color,
        transmission: request.transmission,
        drive_type: request.drive_type,
        fuel_efficiency: request.fuel_efficiency,
        price_per_day: request.price_per_day,
        image_url: request.image_url,
        is_available: request.is_available.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    let car = store.insert_car(&car).await?;
    tracing::info!(car_id = %car.id, name = %car.display_name(), "🚗 Coche creado");
    Ok(car)
}

pub async fn get_car<S>(store: &mut S, id: Uuid) -> AppResult<Car>
where
    S: CarStore + ?Sized,
{
    store
        .find_car(id)
        .await?
        .ok_or_else(|| not_found_error("Car", id))
}

/// Reemplazo completo de los campos editables
pub async fn update_car<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    request: CarRequest,
) -> AppResult<Car>
where
    S: CarStore + ?Sized,
{
    actor.require(Permission::ManageCars)?;
    ensure_positive_price(request.price_per_day)?;

    let current = get_car(store, id).await?;
    let updated = Car {
        make: request.make.trim().to_string(),
        model: request.model.trim().to_string(),
        year: request.year,
        color: request.color,
        transmission: request.transmission,
        drive_type: request.drive_type,
        fuel_efficiency: request.fuel_efficiency,
        price_per_day: request.price_per_day,
        image_url: request.image_url.or(current.image_url.clone()),
        is_available: request.is_available.unwrap_or(current.is_available),
        ..current
    };

    store.update_car(&updated).await
}

pub async fn update_availability<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    available: bool,
) -> AppResult<Car>
where
    S: CarStore + ?Sized,
{
    actor.require(Permission::ManageCars)?;
    store.set_car_availability(id, available).await?;
    tracing::info!(car_id = %id, available, "Disponibilidad actualizada manualmente");
    get_car(store, id).await
}

/// Borra el coche junto con sus reservas
pub async fn delete_car<S>(store: &mut S, actor: &AuthenticatedUser, id: Uuid) -> AppResult<()>
where
    S: CarStore + ?Sized,
{
    actor.require(Permission::ManageCars)?;
    if !store.delete_car(id).await? {
        return Err(not_found_error("Car", id));
    }
    tracing::info!(car_id = %id, "🗑️ Coche eliminado");
    Ok(())
}

pub async fn list_cars<S>(store: &mut S) -> AppResult<Vec<Car>>
where
    S: CarStore + ?Sized,
{
    store.list_cars().await
}

pub async fn available_cars<S>(store: &mut S) -> AppResult<Vec<Car>>
where
    S: CarStore + ?Sized,
{
    store.list_available_cars().await
}

/// Búsqueda por marca sin distinguir mayúsculas
pub async fn cars_by_make<S>(store: &mut S, make: &str) -> AppResult<Vec<Car>>
where
    S: CarStore + ?Sized,
{
    store.find_cars_by_make(make.trim()).await
}

pub async fn cars_by_max_price<S>(store: &mut S, max_price: Decimal) -> AppResult<Vec<Car>>
where
    S: CarStore + ?Sized,
{
    ensure_positive_price(max_price)?;
    store.find_cars_by_max_price(max_price).await
}

pub async fn search_cars<S>(
    store: &mut S,
    filter: &CarFilter,
    page: PageRequest,
) -> AppResult<(Vec<Car>, i64)>
where
    S: CarStore + ?Sized,
{
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(AppError::BadRequest(
                "minPrice cannot be greater than maxPrice".to_string(),
            ));
        }
    }
    store.filter_cars(filter, page).await
}

pub async fn cars_by_year_range<S>(store: &mut S, from: i32, to: i32) -> AppResult<Vec<Car>>
where
    S: CarStore + ?Sized,
{
    if from > to {
        return Err(AppError::BadRequest(
            "startYear cannot be greater than endYear".to_string(),
        ));
    }
    store.find_cars_by_year_range(from, to).await
}

pub async fn stats<S>(store: &mut S) -> AppResult<CarStats>
where
    S: CarStore + ?Sized,
{
    store.car_stats().await
}

/// Coches con reservas activas del usuario actual
pub async fn rented_cars<S>(store: &mut S, actor: &AuthenticatedUser) -> AppResult<Vec<Car>>
where
    S: CarStore + ?Sized,
{
    store.cars_rented_by_user(actor.user_id).await
}

/// Guarda la URL de la imagen subida en el coche
pub async fn set_image<S>(
    store: &mut S,
    actor: &AuthenticatedUser,
    id: Uuid,
    image_url: String,
) -> AppResult<Car>
where
    S: CarStore + ?Sized,
{
    actor.require(Permission::ManageCars)?;
    let car = get_car(store, id).await?;
    store
        .update_car(&Car {
            image_url: Some(image_url),
            ..car
        })
        .await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        auth::Role,
        car::{CarSortKey, SortDirection, TransmissionType, DriveType},
    };
    use crate::repositories::memory::MemoryStore;

    pub(crate) fn admin() -> AuthenticatedUser {
        AuthenticatedUser::new(Uuid::new_v4(), "admin@example.com", Role::Admin)
    }

    pub(crate) fn car_request(make: &str, model: &str, year: i32, price: i64) -> CarRequest {
        CarRequest {
            make: make.to_string(),
            model: model.to_string(),
            year,
            color: Some("Blue".to_string()),
            transmission: TransmissionType::Automatic,
            drive_type: DriveType::Fwd,
            fuel_efficiency: Some(30),
            price_per_day: Decimal::from(price),
            image_url: None,
            is_available: None,
        }
    }

    #[tokio::test]
    async fn test_create_car_rejects_non_positive_price() {
        let mut store = MemoryStore::new();
        let result = create_car(&mut store, &admin(), car_request("Ford", "Focus", 2020, 0)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_car_requires_manage_cars() {
        let mut store = MemoryStore::new();
        let user = AuthenticatedUser::new(Uuid::new_v4(), "u@example.com", Role::User);
        let result = create_car(&mut store, &user, car_request("Ford", "Focus", 2020, 40)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(store.cars.is_empty());
    }

    #[tokio::test]
    async fn test_new_car_is_available_by_default() {
        let mut store = MemoryStore::new();
        let car = create_car(&mut store, &admin(), car_request("Ford", "Focus", 2020, 40))
            .await
            .unwrap();
        assert!(car.is_available);
    }

    #[tokio::test]
    async fn test_search_filters_and_paginates() {
        let mut store = MemoryStore::new();
        let admin = admin();
        for (make, model, year, price) in [
            ("Toyota", "Corolla", 2020, 40),
            ("Toyota", "Yaris", 2021, 30),
            ("Honda", "Civic", 2020, 50),
            ("Tesla", "Model 3", 2023, 90),
        ] {
            create_car(&mut store, &admin, car_request(make, model, year, price))
                .await
                .unwrap();
        }

        let filter = CarFilter {
            make: Some("toy".to_string()),
            sort_by: Some(CarSortKey::PricePerDay),
            sort_direction: Some(SortDirection::Desc),
            ..Default::default()
        };
        let (cars, total) = search_cars(&mut store, &filter, PageRequest::new(Some(0), Some(1)))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].model, "Corolla");

        let filter = CarFilter {
            min_price: Some(Decimal::from(35)),
            max_price: Some(Decimal::from(60)),
            year: Some(2020),
            ..Default::default()
        };
        let (_, total) = search_cars(&mut store, &filter, PageRequest::new(None, None))
            .await
            .unwrap();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_search_rejects_inverted_price_range() {
        let mut store = MemoryStore::new();
        let filter = CarFilter {
            min_price: Some(Decimal::from(100)),
            max_price: Some(Decimal::from(10)),
            ..Default::default()
        };
        assert!(search_cars(&mut store, &filter, PageRequest::new(None, None))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_update_car_keeps_existing_image_when_absent() {
        let mut store = MemoryStore::new();
        let admin = admin();
        let mut request = car_request("Ford", "Focus", 2020, 40);
        request.image_url = Some("/cars/focus.png".to_string());
        let car = create_car(&mut store, &admin, request).await.unwrap();

        let updated = update_car(&mut store, &admin, car.id, car_request("Ford", "Fiesta", 2021, 35))
            .await
            .unwrap();
        assert_eq!(updated.model, "Fiesta");
        assert_eq!(updated.image_url.as_deref(), Some("/cars/focus.png"));
    }

    #[tokio::test]
    async fn test_delete_unknown_car_is_not_found() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            delete_car(&mut store, &admin(), Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_make_lookup_ignores_case_and_price_cap_must_be_positive() {
        let mut store = MemoryStore::new();
        let admin = admin();
        create_car(&mut store, &admin, car_request("Toyota", "Corolla", 2020, 40))
            .await
            .unwrap();
        create_car(&mut store, &admin, car_request("Honda", "Civic", 2020, 70))
            .await
            .unwrap();

        assert_eq!(cars_by_make(&mut store, " TOYOTA ").await.unwrap().len(), 1);
        assert_eq!(
            cars_by_max_price(&mut store, Decimal::from(50)).await.unwrap().len(),
            1
        );
        assert!(cars_by_max_price(&mut store, Decimal::ZERO).await.is_err());
    }

    #[test]
    fn test_page_request_bounds() {
        let page = PageRequest::new(Some(-3), Some(1_000));
        assert_eq!(page.page, 0);
        assert_eq!(page.size, PageRequest::MAX_SIZE);
        assert_eq!(PageRequest::new(Some(2), Some(10)).offset(), 20);
    }
}
