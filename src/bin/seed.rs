use car_marketplace_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{cars::CreateCarRequest, catalog::CreateCatalogEntryRequest},
    models::CatalogKind,
    reference::ReferenceData,
    repository::{CatalogReader, PgRepository},
    services::{car_service, catalog_service},
};

const MAKES: [&str; 6] = ["Toyota", "Volkswagen", "BMW", "Tesla", "Ford", "Mercedes-Benz"];
const COLORS: [&str; 6] = ["Black", "White", "Silver", "Red", "Blue", "Grey"];

struct DemoCar {
    name: &'static str,
    make: &'static str,
    color: &'static str,
    model: &'static str,
    year: i32,
    price: i64,
    mileage: i64,
    fuel_type: &'static str,
    transmission: &'static str,
    body_type: &'static str,
    seats: i32,
    status: &'static str,
    featured: bool,
}

const CARS: [DemoCar; 8] = [
    DemoCar { name: "Toyota Corolla 1.8 Hybrid", make: "toyota", color: "silver", model: "Corolla", year: 2021, price: 21_500, mileage: 38_000, fuel_type: "Hybrid", transmission: "Automatic", body_type: "Hatchback", seats: 5, status: "AVAILABLE", featured: true },
    DemoCar { name: "Toyota RAV4 AWD", make: "toyota", color: "white", model: "RAV4", year: 2019, price: 27_900, mileage: 61_000, fuel_type: "Hybrid", transmission: "Automatic", body_type: "SUV", seats: 5, status: "AVAILABLE", featured: false },
    DemoCar { name: "Volkswagen Golf GTI", make: "volkswagen", color: "red", model: "Golf", year: 2018, price: 19_800, mileage: 72_500, fuel_type: "Petrol", transmission: "Manual", body_type: "Hatchback", seats: 5, status: "AVAILABLE", featured: false },
    DemoCar { name: "Volkswagen Passat Variant", make: "volkswagen", color: "grey", model: "Passat", year: 2017, price: 14_200, mileage: 118_000, fuel_type: "Diesel", transmission: "Automatic", body_type: "Wagon", seats: 5, status: "AVAILABLE", featured: false },
    DemoCar { name: "BMW 330e", make: "bmw", color: "blue", model: "3 Series", year: 2020, price: 29_400, mileage: 45_200, fuel_type: "Plug-in Hybrid", transmission: "Automatic", body_type: "Sedan", seats: 5, status: "AVAILABLE", featured: true },
    DemoCar { name: "Tesla Model 3 Long Range", make: "tesla", color: "black", model: "Model 3", year: 2022, price: 34_900, mileage: 22_000, fuel_type: "Electric", transmission: "Automatic", body_type: "Sedan", seats: 5, status: "AVAILABLE", featured: true },
    DemoCar { name: "Ford Transit Custom", make: "ford", color: "white", model: "Transit", year: 2016, price: 12_500, mileage: 160_000, fuel_type: "Diesel", transmission: "Manual", body_type: "Van", seats: 3, status: "SOLD", featured: false },
    DemoCar { name: "Mercedes-Benz C 200 Cabriolet", make: "mercedes-benz", color: "black", model: "C-Class", year: 2019, price: 31_000, mileage: 40_100, fuel_type: "Petrol", transmission: "Automatic", body_type: "Convertible", seats: 4, status: "UNAVAILABLE", featured: false },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let repo = PgRepository::new(pool);
    // Ensure migrations are applied.
    run_migrations(repo.pool()).await?;

    let reference = ReferenceData::load(config.reference_data_path.as_deref()).await?;

    seed_catalog(&repo, CatalogKind::Make, &MAKES).await?;
    seed_catalog(&repo, CatalogKind::Color, &COLORS).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
        .fetch_one(repo.pool())
        .await?;
    if existing > 0 {
        println!("Cars already present ({existing}), skipping car seed");
        return Ok(());
    }

    for car in &CARS {
        let payload = CreateCarRequest {
            name: car.name.to_string(),
            make: car.make.to_string(),
            color: car.color.to_string(),
            model: car.model.to_string(),
            year: car.year,
            price: car.price,
            mileage: car.mileage,
            fuel_type: car.fuel_type.to_string(),
            transmission: car.transmission.to_string(),
            body_type: car.body_type.to_string(),
            seats: Some(car.seats),
            description: Some(format!("{} in {}, one owner, full service history.", car.model, car.color)),
            status: Some(car.status.to_string()),
            featured: car.featured,
            images: vec![format!("/cars/{}.webp", car.make)],
        };
        let created = car_service::create_car(&repo, &reference, payload)
            .await
            .map_err(|err| anyhow::anyhow!("seeding '{}': {err}", car.name))?;
        println!("Seeded car {} ({})", created.name, created.id);
    }

    println!("Seed completed");
    Ok(())
}

async fn seed_catalog(repo: &PgRepository, kind: CatalogKind, names: &[&str]) -> anyhow::Result<()> {
    for name in names {
        let slug = car_marketplace_api::slug::slugify(name);
        if repo.find_entry_by_slug(kind, &slug).await?.is_some() {
            continue;
        }
        let payload = CreateCatalogEntryRequest {
            name: name.to_string(),
            slug: None,
        };
        catalog_service::create_entry(repo, kind, payload).await?;
        println!("Ensured {} {name}", kind.label());
    }
    Ok(())
}
