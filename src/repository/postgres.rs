use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::{
    AuditWriter, CarReader, CarSearchQuery, CarWriter, CatalogReader, CatalogWriter,
    duplicate_slug, entry_in_use, like_pattern, slug_frozen,
};
use crate::{
    audit::log_audit,
    db::{DbPool, OrmConn, create_orm_conn},
    entity::{
        CarColors, CarMakes, Cars, car_colors, car_makes,
        cars::{ActiveModel as CarActive, Column as CarCol, Model as CarModel},
    },
    enums::CarStatus,
    error::{AppError, AppResult},
    filters::{
        CarFiltersData, CatalogOption, NumericRange, SortBy, options::age_range_from_years,
    },
    models::{Car, CarChanges, CatalogEntry, CatalogKind, CatalogRef, NewCar, NewCatalogEntry},
};

/// PostgreSQL store. Car queries go through SeaORM; aggregates and the
/// catalog tables use sqlx directly on the same pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: DbPool,
    orm: OrmConn,
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        let orm = create_orm_conn(&pool);
        Self { pool, orm }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn orm(&self) -> &OrmConn {
        &self.orm
    }

    async fn hydrate(&self, models: Vec<CarModel>) -> AppResult<Vec<Car>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let make_ids: Vec<Uuid> = models.iter().map(|m| m.make_id).collect();
        let color_ids: Vec<Uuid> = models.iter().map(|m| m.color_id).collect();

        let makes: HashMap<Uuid, CatalogRef> = CarMakes::find()
            .filter(car_makes::Column::Id.is_in(make_ids))
            .all(&self.orm)
            .await?
            .into_iter()
            .map(|m| (m.id, CatalogRef { id: m.id, name: m.name, slug: m.slug }))
            .collect();
        let colors: HashMap<Uuid, CatalogRef> = CarColors::find()
            .filter(car_colors::Column::Id.is_in(color_ids))
            .all(&self.orm)
            .await?
            .into_iter()
            .map(|c| (c.id, CatalogRef { id: c.id, name: c.name, slug: c.slug }))
            .collect();

        models
            .into_iter()
            .map(|model| car_from_entity(model, &makes, &colors))
            .collect()
    }

    async fn catalog_options(&self, kind: CatalogKind) -> AppResult<Vec<CatalogOption>> {
        let sql = format!(
            "SELECT DISTINCT t.name, t.slug FROM {} t JOIN cars c ON c.{} = t.id \
             WHERE c.status = $1 ORDER BY t.name, t.slug",
            kind.table(),
            reference_column(kind)
        );
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .bind(CarStatus::Available.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(name, slug)| CatalogOption { name, slug })
            .collect())
    }

    async fn distinct_values(&self, column: &'static str) -> AppResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {column} FROM cars WHERE status = $1 ORDER BY {column}"
        );
        let values = sqlx::query_scalar::<_, String>(&sql)
            .bind(CarStatus::Available.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }
}

fn reference_column(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::Make => "make_id",
        CatalogKind::Color => "color_id",
    }
}

fn car_from_entity(
    model: CarModel,
    makes: &HashMap<Uuid, CatalogRef>,
    colors: &HashMap<Uuid, CatalogRef>,
) -> AppResult<Car> {
    let make = makes
        .get(&model.make_id)
        .cloned()
        .ok_or_else(|| anyhow!("car {} references missing make {}", model.id, model.make_id))?;
    let color = colors
        .get(&model.color_id)
        .cloned()
        .ok_or_else(|| anyhow!("car {} references missing color {}", model.id, model.color_id))?;
    let status = model.status.parse::<CarStatus>().map_err(anyhow::Error::from)?;
    let images: Vec<String> = serde_json::from_value(model.images).map_err(anyhow::Error::from)?;

    Ok(Car {
        id: model.id,
        name: model.name,
        make,
        color,
        model: model.model,
        year: model.year,
        price: model.price,
        mileage: model.mileage,
        fuel_type: model.fuel_type,
        transmission: model.transmission,
        body_type: model.body_type,
        seats: model.seats,
        description: model.description,
        status,
        featured: model.featured,
        images,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn search_condition(query: &CarSearchQuery) -> Condition {
    let mut condition =
        Condition::all().add(CarCol::Status.eq(CarStatus::Available.as_str()));

    if let Some(search) = &query.search {
        let pattern = like_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(CarCol::Name).ilike(pattern.clone()))
                .add(Expr::col(CarCol::Description).ilike(pattern)),
        );
    }

    if let Some(slug) = &query.make_slug {
        condition = condition.add(
            CarCol::MakeId.in_subquery(
                Query::select()
                    .column(car_makes::Column::Id)
                    .from(CarMakes)
                    .and_where(car_makes::Column::Slug.eq(slug.clone()))
                    .to_owned(),
            ),
        );
    }

    if let Some(slug) = &query.color_slug {
        condition = condition.add(
            CarCol::ColorId.in_subquery(
                Query::select()
                    .column(car_colors::Column::Id)
                    .from(CarColors)
                    .and_where(car_colors::Column::Slug.eq(slug.clone()))
                    .to_owned(),
            ),
        );
    }

    if let Some(body_type) = &query.body_type {
        condition = condition.add(CarCol::BodyType.eq(body_type.clone()));
    }
    if let Some(fuel_type) = &query.fuel_type {
        condition = condition.add(CarCol::FuelType.eq(fuel_type.clone()));
    }
    if let Some(transmission) = &query.transmission {
        condition = condition.add(CarCol::Transmission.eq(transmission.clone()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(CarCol::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(CarCol::Price.lte(max_price));
    }
    if let Some(min_mileage) = query.min_mileage {
        condition = condition.add(CarCol::Mileage.gte(min_mileage));
    }
    if let Some(max_mileage) = query.max_mileage {
        condition = condition.add(CarCol::Mileage.lte(max_mileage));
    }
    if let Some(min_year) = query.min_year {
        condition = condition.add(CarCol::Year.gte(min_year));
    }
    if let Some(max_year) = query.max_year {
        condition = condition.add(CarCol::Year.lte(max_year));
    }

    condition
}

#[derive(sqlx::FromRow)]
struct InventoryBounds {
    min_price: Option<i64>,
    max_price: Option<i64>,
    min_mileage: Option<i64>,
    max_mileage: Option<i64>,
    min_year: Option<i32>,
    max_year: Option<i32>,
}

#[derive(sqlx::FromRow)]
struct CatalogRow {
    id: Uuid,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        CatalogEntry {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CATALOG_COLUMNS: &str = "id, name, slug, created_at, updated_at";

fn map_unique_violation(err: sqlx::Error, kind: CatalogKind, slug: &str) -> AppError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        duplicate_slug(kind, slug)
    } else {
        AppError::DbError(err)
    }
}

#[async_trait]
impl CarReader for PgRepository {
    async fn search_cars(&self, query: &CarSearchQuery) -> AppResult<(u64, Vec<Car>)> {
        let mut finder = Cars::find().filter(search_condition(query));
        finder = match query.sort_by {
            SortBy::Newest => finder.order_by_desc(CarCol::CreatedAt),
            SortBy::PriceAsc => finder.order_by_asc(CarCol::Price),
            SortBy::PriceDesc => finder.order_by_desc(CarCol::Price),
        };
        // secondary key keeps pages stable when the primary key ties
        finder = finder.order_by_asc(CarCol::Id);

        let total = finder.clone().count(&self.orm).await?;

        let models = finder
            .limit(query.limit)
            .offset(query.offset)
            .all(&self.orm)
            .await?;

        let items = self.hydrate(models).await?;
        Ok((total, items))
    }

    async fn filter_options(&self, current_year: i32) -> AppResult<CarFiltersData> {
        let bounds = sqlx::query_as::<_, InventoryBounds>(
            r#"
            SELECT MIN(price) AS min_price, MAX(price) AS max_price,
                   MIN(mileage) AS min_mileage, MAX(mileage) AS max_mileage,
                   MIN(year) AS min_year, MAX(year) AS max_year
            FROM cars
            WHERE status = $1
            "#,
        )
        .bind(CarStatus::Available.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(CarFiltersData {
            makes: self.catalog_options(CatalogKind::Make).await?,
            colors: self.catalog_options(CatalogKind::Color).await?,
            body_types: self.distinct_values("body_type").await?,
            fuel_types: self.distinct_values("fuel_type").await?,
            transmissions: self.distinct_values("transmission").await?,
            price_range: NumericRange::from_bounds(bounds.min_price, bounds.max_price),
            mileage_range: NumericRange::from_bounds(bounds.min_mileage, bounds.max_mileage),
            age_range: age_range_from_years(bounds.min_year, bounds.max_year, current_year),
        })
    }

    async fn get_car(&self, id: Uuid) -> AppResult<Option<Car>> {
        let model = Cars::find_by_id(id).one(&self.orm).await?;
        match model {
            Some(model) => Ok(self.hydrate(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CarWriter for PgRepository {
    async fn insert_car(&self, car: &NewCar) -> AppResult<Car> {
        let active = CarActive {
            id: Set(Uuid::new_v4()),
            name: Set(car.name.clone()),
            make_id: Set(car.make_id),
            color_id: Set(car.color_id),
            model: Set(car.model.clone()),
            year: Set(car.year),
            price: Set(car.price),
            mileage: Set(car.mileage),
            fuel_type: Set(car.fuel_type.clone()),
            transmission: Set(car.transmission.clone()),
            body_type: Set(car.body_type.clone()),
            seats: Set(car.seats),
            description: Set(car.description.clone()),
            status: Set(car.status.as_str().to_string()),
            featured: Set(car.featured),
            images: Set(serde_json::json!(car.images)),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let model = active.insert(&self.orm).await?;
        self.hydrate(vec![model])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(anyhow!("inserted car could not be loaded")))
    }

    async fn update_car(&self, id: Uuid, changes: &CarChanges) -> AppResult<Option<Car>> {
        let Some(existing) = Cars::find_by_id(id).one(&self.orm).await? else {
            return Ok(None);
        };

        let mut active: CarActive = existing.into();
        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(make_id) = changes.make_id {
            active.make_id = Set(make_id);
        }
        if let Some(color_id) = changes.color_id {
            active.color_id = Set(color_id);
        }
        if let Some(model) = &changes.model {
            active.model = Set(model.clone());
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(mileage) = changes.mileage {
            active.mileage = Set(mileage);
        }
        if let Some(fuel_type) = &changes.fuel_type {
            active.fuel_type = Set(fuel_type.clone());
        }
        if let Some(transmission) = &changes.transmission {
            active.transmission = Set(transmission.clone());
        }
        if let Some(body_type) = &changes.body_type {
            active.body_type = Set(body_type.clone());
        }
        if let Some(seats) = changes.seats {
            active.seats = Set(seats);
        }
        if let Some(description) = &changes.description {
            active.description = Set(description.clone());
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(featured) = changes.featured {
            active.featured = Set(featured);
        }
        if let Some(images) = &changes.images {
            active.images = Set(serde_json::json!(images));
        }
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&self.orm).await?;
        Ok(self.hydrate(vec![model]).await?.pop())
    }

    async fn set_car_status(
        &self,
        id: Uuid,
        from: CarStatus,
        to: CarStatus,
    ) -> AppResult<Option<Car>> {
        let result = Cars::update_many()
            .col_expr(CarCol::Status, Expr::value(to.as_str()))
            .col_expr(CarCol::UpdatedAt, Expr::cust("now()"))
            .filter(CarCol::Id.eq(id))
            .filter(CarCol::Status.eq(from.as_str()))
            .exec(&self.orm)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_car(id).await
    }

    async fn delete_car(&self, id: Uuid) -> AppResult<bool> {
        let result = Cars::delete_by_id(id).exec(&self.orm).await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl CatalogReader for PgRepository {
    async fn list_entries(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>> {
        let sql = format!(
            "SELECT {CATALOG_COLUMNS} FROM {} ORDER BY name, slug",
            kind.table()
        );
        let rows = sqlx::query_as::<_, CatalogRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    async fn find_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<Option<CatalogEntry>> {
        let sql = format!("SELECT {CATALOG_COLUMNS} FROM {} WHERE id = $1", kind.table());
        let row = sqlx::query_as::<_, CatalogRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CatalogEntry::from))
    }

    async fn find_entry_by_slug(
        &self,
        kind: CatalogKind,
        slug: &str,
    ) -> AppResult<Option<CatalogEntry>> {
        let sql = format!("SELECT {CATALOG_COLUMNS} FROM {} WHERE slug = $1", kind.table());
        let row = sqlx::query_as::<_, CatalogRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CatalogEntry::from))
    }

    async fn count_cars_using(&self, kind: CatalogKind, id: Uuid) -> AppResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM cars WHERE {} = $1",
            reference_column(kind)
        );
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl CatalogWriter for PgRepository {
    async fn insert_entry(
        &self,
        kind: CatalogKind,
        entry: &NewCatalogEntry,
    ) -> AppResult<CatalogEntry> {
        let sql = format!(
            "INSERT INTO {} (id, name, slug) VALUES ($1, $2, $3) RETURNING {CATALOG_COLUMNS}",
            kind.table()
        );
        let row = sqlx::query_as::<_, CatalogRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&entry.name)
            .bind(&entry.slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_unique_violation(err, kind, &entry.slug))?;
        Ok(row.into())
    }

    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: Uuid,
        entry: &NewCatalogEntry,
    ) -> AppResult<Option<CatalogEntry>> {
        let mut tx = self.pool.begin().await?;

        // The row lock makes car inserts referencing this entry wait, so the
        // reference check below sees every committed car.
        let lock = format!("SELECT slug FROM {} WHERE id = $1 FOR UPDATE", kind.table());
        let Some(current) = sqlx::query_scalar::<_, String>(&lock)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        if current != entry.slug {
            let referenced = format!(
                "SELECT EXISTS (SELECT 1 FROM cars WHERE {} = $1)",
                reference_column(kind)
            );
            let in_use = sqlx::query_scalar::<_, bool>(&referenced)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if in_use {
                return Err(slug_frozen(kind, &current));
            }
        }

        let sql = format!(
            "UPDATE {} SET name = $2, slug = $3, updated_at = now() \
             WHERE id = $1 RETURNING {CATALOG_COLUMNS}",
            kind.table()
        );
        let row = sqlx::query_as::<_, CatalogRow>(&sql)
            .bind(id)
            .bind(&entry.name)
            .bind(&entry.slug)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|err| map_unique_violation(err, kind, &entry.slug))?;
        tx.commit().await?;
        Ok(row.map(CatalogEntry::from))
    }

    async fn delete_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<bool> {
        let Some(existing) = self.find_entry(kind, id).await? else {
            return Ok(false);
        };
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await;
        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(err)
                if err
                    .as_database_error()
                    .is_some_and(|db| db.is_foreign_key_violation()) =>
            {
                Err(entry_in_use(kind, &existing.slug))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl AuditWriter for PgRepository {
    async fn record_audit(
        &self,
        action: &str,
        resource: &str,
        metadata: serde_json::Value,
    ) -> AppResult<()> {
        log_audit(&self.pool, action, resource, metadata).await
    }
}
