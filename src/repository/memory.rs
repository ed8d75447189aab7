use std::{
    cmp::Ordering,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{
    AuditWriter, CarReader, CarSearchQuery, CarWriter, CatalogReader, CatalogWriter,
    duplicate_slug, entry_in_use, slug_frozen,
};
use crate::{
    enums::CarStatus,
    error::{AppError, AppResult},
    filters::{CarFiltersData, SortBy},
    models::{AuditEntry, Car, CarChanges, CatalogEntry, CatalogKind, NewCar, NewCatalogEntry},
};

#[derive(Debug, Default)]
struct Inventory {
    makes: Vec<CatalogEntry>,
    colors: Vec<CatalogEntry>,
    cars: Vec<Car>,
    audit: Vec<AuditEntry>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Inventory {
    fn entries(&self, kind: CatalogKind) -> &Vec<CatalogEntry> {
        match kind {
            CatalogKind::Make => &self.makes,
            CatalogKind::Color => &self.colors,
        }
    }

    fn entries_mut(&mut self, kind: CatalogKind) -> &mut Vec<CatalogEntry> {
        match kind {
            CatalogKind::Make => &mut self.makes,
            CatalogKind::Color => &mut self.colors,
        }
    }

    fn entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<&CatalogEntry> {
        self.entries(kind)
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::not_found(kind.title()))
    }

    /// Strictly increasing timestamps, so `newest` ordering is deterministic
    /// even when rows are written within the same clock tick.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn cars_using(&self, kind: CatalogKind, id: Uuid) -> usize {
        self.cars
            .iter()
            .filter(|car| match kind {
                CatalogKind::Make => car.make.id == id,
                CatalogKind::Color => car.color.id == id,
            })
            .count()
    }
}

/// Process-local store with the same search semantics as [`super::PgRepository`].
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: RwLock<Inventory>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audit_entries(&self) -> AppResult<Vec<AuditEntry>> {
        Ok(self.read()?.audit.clone())
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Inventory>> {
        self.inner
            .read()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("inventory lock poisoned")))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Inventory>> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("inventory lock poisoned")))
    }
}

fn matches(query: &CarSearchQuery, car: &Car) -> bool {
    if !car.is_available() {
        return false;
    }
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        let in_name = car.name.to_lowercase().contains(&needle);
        let in_description = car
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle));
        if !in_name && !in_description {
            return false;
        }
    }

    let same = |wanted: &Option<String>, actual: &str| wanted.as_deref().is_none_or(|w| w == actual);
    let within = |value: i64, min: Option<i64>, max: Option<i64>| {
        min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
    };

    same(&query.make_slug, &car.make.slug)
        && same(&query.color_slug, &car.color.slug)
        && same(&query.body_type, &car.body_type)
        && same(&query.fuel_type, &car.fuel_type)
        && same(&query.transmission, &car.transmission)
        && within(car.price, query.min_price, query.max_price)
        && within(car.mileage, query.min_mileage, query.max_mileage)
        && within(
            i64::from(car.year),
            query.min_year.map(i64::from),
            query.max_year.map(i64::from),
        )
}

fn compare(sort_by: SortBy, a: &Car, b: &Car) -> Ordering {
    let primary = match sort_by {
        SortBy::Newest => b.created_at.cmp(&a.created_at),
        SortBy::PriceAsc => a.price.cmp(&b.price),
        SortBy::PriceDesc => b.price.cmp(&a.price),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl CarReader for InMemoryRepository {
    async fn search_cars(&self, query: &CarSearchQuery) -> AppResult<(u64, Vec<Car>)> {
        let inventory = self.read()?;
        let mut found: Vec<&Car> = inventory.cars.iter().filter(|car| matches(query, car)).collect();
        found.sort_by(|a, b| compare(query.sort_by, a, b));

        let total = found.len() as u64;
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let page = found.into_iter().skip(offset).take(limit).cloned().collect();
        Ok((total, page))
    }

    async fn filter_options(&self, current_year: i32) -> AppResult<CarFiltersData> {
        let inventory = self.read()?;
        Ok(CarFiltersData::from_inventory(&inventory.cars, current_year))
    }

    async fn get_car(&self, id: Uuid) -> AppResult<Option<Car>> {
        Ok(self.read()?.cars.iter().find(|car| car.id == id).cloned())
    }
}

#[async_trait]
impl CarWriter for InMemoryRepository {
    async fn insert_car(&self, car: &NewCar) -> AppResult<Car> {
        let mut inventory = self.write()?;
        let make = inventory.entry(CatalogKind::Make, car.make_id)?.to_ref();
        let color = inventory.entry(CatalogKind::Color, car.color_id)?.to_ref();
        let now = inventory.tick();

        let car = Car {
            id: Uuid::new_v4(),
            name: car.name.clone(),
            make,
            color,
            model: car.model.clone(),
            year: car.year,
            price: car.price,
            mileage: car.mileage,
            fuel_type: car.fuel_type.clone(),
            transmission: car.transmission.clone(),
            body_type: car.body_type.clone(),
            seats: car.seats,
            description: car.description.clone(),
            status: car.status,
            featured: car.featured,
            images: car.images.clone(),
            created_at: now,
            updated_at: now,
        };
        inventory.cars.push(car.clone());
        Ok(car)
    }

    async fn update_car(&self, id: Uuid, changes: &CarChanges) -> AppResult<Option<Car>> {
        let mut inventory = self.write()?;
        let make = match changes.make_id {
            Some(make_id) => Some(inventory.entry(CatalogKind::Make, make_id)?.to_ref()),
            None => None,
        };
        let color = match changes.color_id {
            Some(color_id) => Some(inventory.entry(CatalogKind::Color, color_id)?.to_ref()),
            None => None,
        };
        let now = inventory.tick();

        let Some(car) = inventory.cars.iter_mut().find(|car| car.id == id) else {
            return Ok(None);
        };
        if let Some(make) = make {
            car.make = make;
        }
        if let Some(color) = color {
            car.color = color;
        }
        if let Some(name) = &changes.name {
            car.name = name.clone();
        }
        if let Some(model) = &changes.model {
            car.model = model.clone();
        }
        if let Some(year) = changes.year {
            car.year = year;
        }
        if let Some(price) = changes.price {
            car.price = price;
        }
        if let Some(mileage) = changes.mileage {
            car.mileage = mileage;
        }
        if let Some(fuel_type) = &changes.fuel_type {
            car.fuel_type = fuel_type.clone();
        }
        if let Some(transmission) = &changes.transmission {
            car.transmission = transmission.clone();
        }
        if let Some(body_type) = &changes.body_type {
            car.body_type = body_type.clone();
        }
        if let Some(seats) = changes.seats {
            car.seats = seats;
        }
        if let Some(description) = &changes.description {
            car.description = description.clone();
        }
        if let Some(status) = changes.status {
            car.status = status;
        }
        if let Some(featured) = changes.featured {
            car.featured = featured;
        }
        if let Some(images) = &changes.images {
            car.images = images.clone();
        }
        car.updated_at = now;
        Ok(Some(car.clone()))
    }

    async fn set_car_status(
        &self,
        id: Uuid,
        from: CarStatus,
        to: CarStatus,
    ) -> AppResult<Option<Car>> {
        let mut inventory = self.write()?;
        let now = inventory.tick();
        let Some(car) = inventory
            .cars
            .iter_mut()
            .find(|car| car.id == id && car.status == from)
        else {
            return Ok(None);
        };
        car.status = to;
        car.updated_at = now;
        Ok(Some(car.clone()))
    }

    async fn delete_car(&self, id: Uuid) -> AppResult<bool> {
        let mut inventory = self.write()?;
        let before = inventory.cars.len();
        inventory.cars.retain(|car| car.id != id);
        Ok(inventory.cars.len() != before)
    }
}

#[async_trait]
impl CatalogReader for InMemoryRepository {
    async fn list_entries(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>> {
        let mut entries = self.read()?.entries(kind).clone();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
        Ok(entries)
    }

    async fn find_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<Option<CatalogEntry>> {
        Ok(self.read()?.entries(kind).iter().find(|e| e.id == id).cloned())
    }

    async fn find_entry_by_slug(
        &self,
        kind: CatalogKind,
        slug: &str,
    ) -> AppResult<Option<CatalogEntry>> {
        Ok(self
            .read()?
            .entries(kind)
            .iter()
            .find(|e| e.slug == slug)
            .cloned())
    }

    async fn count_cars_using(&self, kind: CatalogKind, id: Uuid) -> AppResult<u64> {
        Ok(self.read()?.cars_using(kind, id) as u64)
    }
}

#[async_trait]
impl CatalogWriter for InMemoryRepository {
    async fn insert_entry(
        &self,
        kind: CatalogKind,
        entry: &NewCatalogEntry,
    ) -> AppResult<CatalogEntry> {
        let mut inventory = self.write()?;
        if inventory.entries(kind).iter().any(|e| e.slug == entry.slug) {
            return Err(duplicate_slug(kind, &entry.slug));
        }
        let now = inventory.tick();
        let created = CatalogEntry {
            id: Uuid::new_v4(),
            name: entry.name.clone(),
            slug: entry.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        inventory.entries_mut(kind).push(created.clone());
        Ok(created)
    }

    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: Uuid,
        entry: &NewCatalogEntry,
    ) -> AppResult<Option<CatalogEntry>> {
        let mut inventory = self.write()?;
        if inventory
            .entries(kind)
            .iter()
            .any(|e| e.id != id && e.slug == entry.slug)
        {
            return Err(duplicate_slug(kind, &entry.slug));
        }
        let Some(current) = inventory.entries(kind).iter().find(|e| e.id == id) else {
            return Ok(None);
        };
        if current.slug != entry.slug && inventory.cars_using(kind, id) > 0 {
            return Err(slug_frozen(kind, &current.slug));
        }
        let now = inventory.tick();
        let Some(existing) = inventory.entries_mut(kind).iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        existing.name = entry.name.clone();
        existing.slug = entry.slug.clone();
        existing.updated_at = now;
        let updated = existing.clone();

        let reference = updated.to_ref();
        for car in inventory.cars.iter_mut() {
            let slot = match kind {
                CatalogKind::Make => &mut car.make,
                CatalogKind::Color => &mut car.color,
            };
            if slot.id == id {
                *slot = reference.clone();
            }
        }
        Ok(Some(updated))
    }

    async fn delete_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<bool> {
        let mut inventory = self.write()?;
        let Some(slug) = inventory
            .entries(kind)
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.slug.clone())
        else {
            return Ok(false);
        };
        if inventory.cars_using(kind, id) > 0 {
            return Err(entry_in_use(kind, &slug));
        }
        inventory.entries_mut(kind).retain(|e| e.id != id);
        Ok(true)
    }
}

#[async_trait]
impl AuditWriter for InMemoryRepository {
    async fn record_audit(
        &self,
        action: &str,
        resource: &str,
        metadata: serde_json::Value,
    ) -> AppResult<()> {
        let mut inventory = self.write()?;
        let now = inventory.tick();
        inventory.audit.push(AuditEntry {
            id: Uuid::new_v4(),
            action: action.to_string(),
            resource: resource.to_string(),
            metadata,
            created_at: now,
        });
        Ok(())
    }
}
