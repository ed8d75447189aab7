use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::cars::{CarList, CreateCarRequest, UpdateCarRequest, UpdateCarStatusRequest},
    enums::CarStatus,
    error::{AppError, AppResult},
    filters::{CarFiltersData, PageLimits, RawCarFilters, normalize},
    models::{Car, CarChanges, CatalogKind, NewCar},
    reference::ReferenceData,
    repository::{CarReader, CarSearchQuery, CarWriter, CatalogReader, Repository},
    response::PaginationInfo,
    services::{audit, current_year},
    validation::ValidationErrors,
};

/// Validates the raw filters and runs the search.
///
/// The options snapshot is only read when a categorical filter needs
/// checking, so malformed numeric or paging input never reaches the store.
pub async fn search_cars<R>(
    repo: &R,
    raw: &RawCarFilters,
    limits: PageLimits,
) -> AppResult<CarList>
where
    R: CarReader + ?Sized,
{
    let year = current_year();
    let options = if raw.has_categorical() {
        repo.filter_options(year).await?
    } else {
        CarFiltersData::default()
    };
    let filters = normalize(raw, &options, limits)?;

    let mut query = CarSearchQuery::from_filters(&filters, year);
    let (mut total, mut items) = repo.search_cars(&query).await?;
    let mut pagination = PaginationInfo::new(total, filters.page, filters.limit);
    if pagination.page != filters.page && total > 0 {
        // Requested page is past the end; serve the last one instead.
        query.offset = (pagination.page - 1) * pagination.limit;
        (total, items) = repo.search_cars(&query).await?;
        pagination = PaginationInfo::new(total, pagination.page, filters.limit);
    }
    tracing::debug!(total, page = pagination.page, limit = pagination.limit, "car search");

    Ok(CarList { items, pagination })
}

pub async fn filter_options<R>(repo: &R) -> AppResult<CarFiltersData>
where
    R: CarReader + ?Sized,
{
    repo.filter_options(current_year()).await
}

pub async fn get_car<R>(repo: &R, id: Uuid) -> AppResult<Car>
where
    R: CarReader + ?Sized,
{
    repo.get_car(id)
        .await?
        .ok_or_else(|| AppError::not_found("Car"))
}

pub async fn create_car<R>(
    repo: &R,
    reference: &ReferenceData,
    payload: CreateCarRequest,
) -> AppResult<Car>
where
    R: Repository + ?Sized,
{
    let mut errors = ValidationErrors::from_rules(payload.validate());
    let name = payload.name.trim().to_string();
    let model = payload.model.trim().to_string();
    let body_type = canonical_body_type(&mut errors, reference, &payload.body_type);
    let fuel_type = canonical_fuel_type(&mut errors, reference, &payload.fuel_type);
    let transmission = canonical_transmission(&mut errors, reference, &payload.transmission);
    let status = match payload.status.as_deref() {
        Some(raw) => match raw.trim().parse::<CarStatus>() {
            Ok(status) => status,
            Err(err) => {
                errors.add("status", err.to_string());
                CarStatus::Available
            }
        },
        None => CarStatus::Available,
    };
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let make = resolve_slug(repo, CatalogKind::Make, &payload.make).await?;
    let color = resolve_slug(repo, CatalogKind::Color, &payload.color).await?;

    let new_car = NewCar {
        name,
        make_id: make,
        color_id: color,
        model,
        year: payload.year,
        price: payload.price,
        mileage: payload.mileage,
        fuel_type,
        transmission,
        body_type,
        seats: payload.seats,
        description: non_blank(payload.description),
        status,
        featured: payload.featured,
        images: payload.images,
    };
    let car = repo.insert_car(&new_car).await?;
    tracing::info!(car_id = %car.id, make = %car.make.slug, "car created");

    audit(
        repo,
        "car_create",
        "cars",
        json!({ "car_id": car.id, "make": car.make.slug, "status": car.status }),
    )
    .await;

    Ok(car)
}

pub async fn update_car<R>(
    repo: &R,
    reference: &ReferenceData,
    id: Uuid,
    payload: UpdateCarRequest,
) -> AppResult<Car>
where
    R: Repository + ?Sized,
{
    let mut errors = ValidationErrors::from_rules(payload.validate());
    let mut changes = CarChanges {
        name: payload.name.as_deref().map(|name| name.trim().to_string()),
        model: payload.model.as_deref().map(|model| model.trim().to_string()),
        year: payload.year,
        price: payload.price,
        mileage: payload.mileage,
        seats: payload.seats.map(Some),
        featured: payload.featured,
        images: payload.images,
        ..Default::default()
    };
    if let Some(body_type) = payload.body_type.as_deref() {
        changes.body_type = Some(canonical_body_type(&mut errors, reference, body_type));
    }
    if let Some(fuel_type) = payload.fuel_type.as_deref() {
        changes.fuel_type = Some(canonical_fuel_type(&mut errors, reference, fuel_type));
    }
    if let Some(transmission) = payload.transmission.as_deref() {
        changes.transmission = Some(canonical_transmission(&mut errors, reference, transmission));
    }
    if payload.description.is_some() {
        // a blank description clears it
        changes.description = Some(non_blank(payload.description));
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if let Some(make) = payload.make.as_deref() {
        changes.make_id = Some(resolve_slug(repo, CatalogKind::Make, make).await?);
    }
    if let Some(color) = payload.color.as_deref() {
        changes.color_id = Some(resolve_slug(repo, CatalogKind::Color, color).await?);
    }

    let car = repo
        .update_car(id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Car"))?;

    audit(repo, "car_update", "cars", json!({ "car_id": car.id })).await;

    Ok(car)
}

/// Moves a car along the `CarStatus` lifecycle. Requesting the current
/// status is a no-op.
pub async fn change_status<R>(
    repo: &R,
    id: Uuid,
    payload: UpdateCarStatusRequest,
) -> AppResult<Car>
where
    R: Repository + ?Sized,
{
    let next = payload
        .status
        .trim()
        .parse::<CarStatus>()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let car = get_car(repo, id).await?;
    if car.status == next {
        return Ok(car);
    }
    if !car.status.can_transition_to(next) {
        let message = if car.status.is_terminal() {
            format!("car is {} and its status can no longer change", car.status)
        } else {
            format!("cannot change status from {} to {}", car.status, next)
        };
        return Err(ValidationErrors::single("status", message).into());
    }

    let Some(updated) = repo.set_car_status(id, car.status, next).await? else {
        // Another request moved the car between the read and the write.
        return Err(match repo.get_car(id).await? {
            Some(current) => AppError::Conflict(format!(
                "car status changed to {} by another request",
                current.status
            )),
            None => AppError::not_found("Car"),
        });
    };
    tracing::info!(car_id = %id, from = %car.status, to = %next, "car status changed");

    audit(
        repo,
        "car_status_change",
        "cars",
        json!({ "car_id": id, "from": car.status, "to": next }),
    )
    .await;

    Ok(updated)
}

pub async fn delete_car<R>(repo: &R, id: Uuid) -> AppResult<()>
where
    R: Repository + ?Sized,
{
    if !repo.delete_car(id).await? {
        return Err(AppError::not_found("Car"));
    }
    audit(repo, "car_delete", "cars", json!({ "car_id": id })).await;
    Ok(())
}

async fn resolve_slug<R>(repo: &R, kind: CatalogKind, slug: &str) -> AppResult<Uuid>
where
    R: CatalogReader + ?Sized,
{
    let wanted = slug.trim().to_lowercase();
    repo.find_entry_by_slug(kind, &wanted)
        .await?
        .map(|entry| entry.id)
        .ok_or_else(|| AppError::not_found(format!("{} '{}'", kind.title(), slug.trim())))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn canonical_body_type(
    errors: &mut ValidationErrors,
    reference: &ReferenceData,
    value: &str,
) -> String {
    match reference.body_type(value.trim()) {
        Some(body_type) => body_type.name.clone(),
        None => {
            errors.add("bodyType", format!("unknown body type '{}'", value.trim()));
            String::new()
        }
    }
}

fn canonical_fuel_type(
    errors: &mut ValidationErrors,
    reference: &ReferenceData,
    value: &str,
) -> String {
    match reference.fuel_type(value.trim()) {
        Some(fuel_type) => fuel_type.to_string(),
        None => {
            errors.add("fuelType", format!("unknown fuel type '{}'", value.trim()));
            String::new()
        }
    }
}

fn canonical_transmission(
    errors: &mut ValidationErrors,
    reference: &ReferenceData,
    value: &str,
) -> String {
    match reference.transmission(value.trim()) {
        Some(transmission) => transmission.to_string(),
        None => {
            errors.add(
                "transmission",
                format!("unknown transmission '{}'", value.trim()),
            );
            String::new()
        }
    }
}
