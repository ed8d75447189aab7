//! Persistence seams. Services depend on these traits; `postgres` backs the
//! server and `memory` backs tests and local demos.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    enums::CarStatus,
    error::{AppError, AppResult},
    filters::{CarFilters, CarFiltersData, SortBy},
    models::{Car, CarChanges, CatalogEntry, CatalogKind, NewCar, NewCatalogEntry},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

/// A search over `AVAILABLE` cars, expressed in store terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarSearchQuery {
    pub search: Option<String>,
    pub make_slug: Option<String>,
    pub color_slug: Option<String>,
    pub body_type: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_mileage: Option<i64>,
    pub max_mileage: Option<i64>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub sort_by: SortBy,
    pub offset: u64,
    pub limit: u64,
}

impl CarSearchQuery {
    pub fn from_filters(filters: &CarFilters, current_year: i32) -> Self {
        let (min_year, max_year) = filters.year_bounds(current_year);
        let to_i64 = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        Self {
            search: filters.search.clone(),
            make_slug: filters.make.clone(),
            color_slug: filters.color.clone(),
            body_type: filters.body_type.clone(),
            fuel_type: filters.fuel_type.clone(),
            transmission: filters.transmission.clone(),
            min_price: filters.min_price.map(to_i64),
            max_price: filters.max_price.map(to_i64),
            min_mileage: filters.min_mileage.map(to_i64),
            max_mileage: filters.max_mileage.map(to_i64),
            min_year,
            max_year,
            sort_by: filters.sort_by,
            offset: filters.offset(),
            limit: filters.limit,
        }
    }
}

#[async_trait]
pub trait CarReader: Send + Sync {
    /// Returns the number of matching `AVAILABLE` cars and the requested page.
    /// Every sort order breaks ties on `id` so pages are stable.
    async fn search_cars(&self, query: &CarSearchQuery) -> AppResult<(u64, Vec<Car>)>;

    /// Filter options computed over `AVAILABLE` cars only.
    async fn filter_options(&self, current_year: i32) -> AppResult<CarFiltersData>;

    async fn get_car(&self, id: Uuid) -> AppResult<Option<Car>>;
}

#[async_trait]
pub trait CarWriter: Send + Sync {
    async fn insert_car(&self, car: &NewCar) -> AppResult<Car>;
    async fn update_car(&self, id: Uuid, changes: &CarChanges) -> AppResult<Option<Car>>;
    /// Moves the car to `to` only while its stored status is still `from`.
    /// Returns `None` when the car is gone or its status has moved on.
    async fn set_car_status(
        &self,
        id: Uuid,
        from: CarStatus,
        to: CarStatus,
    ) -> AppResult<Option<Car>>;
    async fn delete_car(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn list_entries(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>>;
    async fn find_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<Option<CatalogEntry>>;
    async fn find_entry_by_slug(
        &self,
        kind: CatalogKind,
        slug: &str,
    ) -> AppResult<Option<CatalogEntry>>;
    /// Number of cars (any status) referencing the entry.
    async fn count_cars_using(&self, kind: CatalogKind, id: Uuid) -> AppResult<u64>;
}

#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Fails with `Conflict` when the slug is taken.
    async fn insert_entry(
        &self,
        kind: CatalogKind,
        entry: &NewCatalogEntry,
    ) -> AppResult<CatalogEntry>;
    /// Fails with `Conflict` when the slug is taken, or when it would
    /// change while any car references the entry.
    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: Uuid,
        entry: &NewCatalogEntry,
    ) -> AppResult<Option<CatalogEntry>>;
    async fn delete_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait AuditWriter: Send + Sync {
    async fn record_audit(
        &self,
        action: &str,
        resource: &str,
        metadata: serde_json::Value,
    ) -> AppResult<()>;
}

/// Everything the HTTP layer needs from a store.
pub trait Repository: CarReader + CarWriter + CatalogReader + CatalogWriter + AuditWriter {}

impl<T> Repository for T where T: CarReader + CarWriter + CatalogReader + CatalogWriter + AuditWriter
{}

pub(crate) fn duplicate_slug(kind: CatalogKind, slug: &str) -> AppError {
    AppError::Conflict(format!("a {} with slug '{slug}' already exists", kind.label()))
}

pub(crate) fn slug_frozen(kind: CatalogKind, slug: &str) -> AppError {
    AppError::Conflict(format!(
        "{} '{slug}' is referenced by cars, its slug cannot change",
        kind.label()
    ))
}

pub(crate) fn entry_in_use(kind: CatalogKind, slug: &str) -> AppError {
    AppError::Conflict(format!("{} '{slug}' is still referenced by cars", kind.label()))
}

/// Escapes `LIKE` wildcards so user text matches literally.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern("civic"), "%civic%");
    }

    #[test]
    fn query_from_filters_uses_offset_and_years() {
        let filters = CarFilters {
            page: 3,
            limit: 10,
            min_age: Some(1),
            max_price: Some(30_000),
            ..Default::default()
        };
        let query = CarSearchQuery::from_filters(&filters, 2025);
        assert_eq!(query.offset, 20);
        assert_eq!(query.limit, 10);
        assert_eq!(query.max_year, Some(2024));
        assert_eq!(query.min_year, None);
        assert_eq!(query.max_price, Some(30_000));
    }
}
