use car_marketplace_api::{
    db::{create_pool, run_migrations},
    dto::{
        cars::{CreateCarRequest, UpdateCarStatusRequest},
        catalog::CreateCatalogEntryRequest,
    },
    enums::CarStatus,
    error::AppError,
    filters::PageLimits,
    models::{CatalogKind, NewCatalogEntry},
    reference::ReferenceData,
    repository::{CarWriter, CatalogWriter, PgRepository},
    services::{car_service, catalog_service, current_year},
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

// Integration flow against PostgreSQL: catalog -> cars -> search -> options -> status change.
#[tokio::test]
async fn catalog_search_and_status_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let pool = create_pool(&database_url).await?;
    let repo = PgRepository::new(pool);
    run_migrations(repo.pool()).await?;
    reset(&repo).await?;

    let reference = ReferenceData::builtin();
    let limits = PageLimits::default();
    // unique suffix so reruns against a shared database do not collide
    let tag = Uuid::new_v4().simple().to_string()[..8].to_string();

    let make = catalog_service::create_entry(
        &repo,
        CatalogKind::Make,
        CreateCatalogEntryRequest {
            name: format!("Flowmake {tag}"),
            slug: None,
        },
    )
    .await?;
    let color = catalog_service::create_entry(
        &repo,
        CatalogKind::Color,
        CreateCatalogEntryRequest {
            name: format!("Flowcolor {tag}"),
            slug: None,
        },
    )
    .await?;

    let duplicate = catalog_service::create_entry(
        &repo,
        CatalogKind::Make,
        CreateCatalogEntryRequest {
            name: format!("FLOWMAKE {tag}"),
            slug: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let mut ids = Vec::new();
    for (i, price) in [15_000_i64, 12_000, 15_000, 30_000].into_iter().enumerate() {
        let car = car_service::create_car(
            &repo,
            &reference,
            CreateCarRequest {
                name: format!("Flow car {i} {tag}"),
                make: make.slug.clone(),
                color: color.slug.clone(),
                model: "Flow".to_string(),
                year: current_year() - i as i32,
                price,
                mileage: 10_000 * (i as i64 + 1),
                fuel_type: "Petrol".to_string(),
                transmission: "Automatic".to_string(),
                body_type: "Hatchback".to_string(),
                seats: Some(5),
                description: Some(format!("flow test 100% {tag}")),
                status: None,
                featured: i == 0,
                images: vec![format!("/cars/{i}.webp")],
            },
        )
        .await?;
        ids.push(car.id);
    }

    let query = format!("make={}&sortBy=priceAsc&limit=3", make.slug.to_uppercase());
    let raw = car_marketplace_api::filters::RawCarFilters::from_query_string(&query)?;
    let page = car_service::search_cars(&repo, &raw, limits).await?;
    assert_eq!(page.pagination.total, 4);
    assert_eq!(page.pagination.pages, 2);
    let prices: Vec<i64> = page.items.iter().map(|c| c.price).collect();
    assert_eq!(prices, vec![12_000, 15_000, 15_000]);
    assert!(page.items[1].id < page.items[2].id);
    assert_eq!(page.items[0].make.slug, make.slug);
    assert_eq!(page.items[0].images.len(), 1);

    let raw = car_marketplace_api::filters::RawCarFilters::from_query_string(&format!(
        "search=100%25+{tag}"
    ))?;
    assert_eq!(car_service::search_cars(&repo, &raw, limits).await?.pagination.total, 4);
    let raw = car_marketplace_api::filters::RawCarFilters::from_query_string(&format!(
        "search=1_0%25+{tag}"
    ))?;
    assert_eq!(car_service::search_cars(&repo, &raw, limits).await?.pagination.total, 0);

    let sold = car_service::change_status(
        &repo,
        ids[3],
        UpdateCarStatusRequest {
            status: "SOLD".to_string(),
        },
    )
    .await?;
    assert_eq!(sold.status.as_str(), "SOLD");

    // A write checked against a stale status leaves the sold car alone.
    let stale = repo
        .set_car_status(ids[3], CarStatus::Available, CarStatus::Unavailable)
        .await?;
    assert!(stale.is_none());

    let frozen = repo
        .update_entry(
            CatalogKind::Make,
            make.id,
            &NewCatalogEntry {
                name: make.name.clone(),
                slug: format!("renamed-{tag}"),
            },
        )
        .await;
    assert!(matches!(frozen, Err(AppError::Conflict(_))));

    let raw = car_marketplace_api::filters::RawCarFilters::from_query_string(&format!(
        "make={}",
        make.slug
    ))?;
    assert_eq!(car_service::search_cars(&repo, &raw, limits).await?.pagination.total, 3);

    let options = car_service::filter_options(&repo).await?;
    assert!(options.makes.iter().any(|m| m.slug == make.slug));
    assert!(options.body_types.iter().any(|b| b == "Hatchback"));
    assert!(options.price_range.min <= 12_000);
    assert!(options.price_range.min <= options.price_range.max);

    let in_use = catalog_service::delete_entry(&repo, CatalogKind::Color, color.id).await;
    assert!(matches!(in_use, Err(AppError::Conflict(_))));

    for id in ids {
        car_service::delete_car(&repo, id).await?;
    }
    catalog_service::delete_entry(&repo, CatalogKind::Color, color.id).await?;
    catalog_service::delete_entry(&repo, CatalogKind::Make, make.id).await?;

    let audits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE metadata->>'slug' = $1")
        .bind(&make.slug)
        .fetch_one(repo.pool())
        .await?;
    assert_eq!(audits, 2);

    Ok(())
}

async fn reset(repo: &PgRepository) -> anyhow::Result<()> {
    let backend = repo.orm().get_database_backend();
    repo.orm()
        .execute(Statement::from_string(
            backend,
            "DELETE FROM cars WHERE name LIKE 'Flow car %'".to_string(),
        ))
        .await?;
    Ok(())
}
