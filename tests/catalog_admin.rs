mod common;

use car_marketplace_api::{
    dto::{
        cars::{CreateCarRequest, UpdateCarRequest, UpdateCarStatusRequest},
        catalog::{CreateCatalogEntryRequest, UpdateCatalogEntryRequest},
    },
    enums::CarStatus,
    error::AppError,
    models::{CatalogKind, NewCatalogEntry},
    reference::ReferenceData,
    repository::{CarReader, CarWriter, CatalogWriter},
    services::{car_service, catalog_service, current_year},
};

use common::{add_car, catalog, memory_repo, new_car};

fn create_make(name: &str) -> CreateCatalogEntryRequest {
    CreateCatalogEntryRequest {
        name: name.to_string(),
        slug: None,
    }
}

fn car_request(make: &str, color: &str) -> CreateCarRequest {
    CreateCarRequest {
        name: "Octavia Combi".to_string(),
        make: make.to_string(),
        color: color.to_string(),
        model: "Octavia".to_string(),
        year: current_year() - 2,
        price: 18_500,
        mileage: 30_000,
        fuel_type: "Diesel".to_string(),
        transmission: "Manual".to_string(),
        body_type: "Wagon".to_string(),
        seats: Some(5),
        description: Some("  Towbar, winter tyres  ".to_string()),
        status: None,
        featured: false,
        images: vec!["/cars/octavia.webp".to_string()],
    }
}

#[tokio::test]
async fn slug_is_derived_and_unique() {
    let repo = memory_repo();
    let entry = catalog_service::create_entry(repo.as_ref(), CatalogKind::Make, create_make("Škoda Auto"))
        .await
        .expect("create");
    assert_eq!(entry.slug, "skoda-auto");

    let err = catalog_service::create_entry(
        repo.as_ref(),
        CatalogKind::Make,
        CreateCatalogEntryRequest {
            name: "Skoda".to_string(),
            slug: Some("SKODA auto".to_string()),
        },
    )
    .await
    .expect_err("duplicate slug");
    assert!(matches!(err, AppError::Conflict(_)));

    let err = catalog_service::create_entry(repo.as_ref(), CatalogKind::Color, create_make("  "))
        .await
        .expect_err("blank name");
    match err {
        AppError::Validation(errors) => {
            assert!(errors.has_field("name"));
            assert!(errors.has_field("slug"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn referenced_slug_cannot_change_but_name_can() {
    let repo = memory_repo();
    let make = catalog(&repo, CatalogKind::Make, "Volkswagen").await;
    let color = catalog(&repo, CatalogKind::Color, "Silver").await;
    let car = add_car(&repo, new_car("Golf", &make, &color)).await;

    let renamed = catalog_service::update_entry(
        repo.as_ref(),
        CatalogKind::Make,
        make.id,
        UpdateCatalogEntryRequest {
            name: Some("VW".to_string()),
            slug: None,
        },
    )
    .await
    .expect("rename");
    assert_eq!(renamed.name, "VW");
    assert_eq!(renamed.slug, "volkswagen");

    let stored = car_service::get_car(repo.as_ref(), car.id).await.expect("car");
    assert_eq!(stored.make.name, "VW");

    let err = catalog_service::update_entry(
        repo.as_ref(),
        CatalogKind::Make,
        make.id,
        UpdateCatalogEntryRequest {
            name: None,
            slug: Some("vw".to_string()),
        },
    )
    .await
    .expect_err("slug frozen");
    assert!(matches!(err, AppError::Conflict(_)));

    let err = catalog_service::delete_entry(repo.as_ref(), CatalogKind::Make, make.id)
        .await
        .expect_err("still referenced");
    assert!(matches!(err, AppError::Conflict(_)));

    car_service::delete_car(repo.as_ref(), car.id).await.expect("delete car");
    catalog_service::delete_entry(repo.as_ref(), CatalogKind::Make, make.id)
        .await
        .expect("delete make");
    let err = catalog_service::delete_entry(repo.as_ref(), CatalogKind::Make, make.id)
        .await
        .expect_err("already gone");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn unreferenced_slug_can_change() {
    let repo = memory_repo();
    let color = catalog(&repo, CatalogKind::Color, "Gray").await;
    let updated = catalog_service::update_entry(
        repo.as_ref(),
        CatalogKind::Color,
        color.id,
        UpdateCatalogEntryRequest {
            name: Some("Grey".to_string()),
            slug: Some("Grey".to_string()),
        },
    )
    .await
    .expect("update");
    assert_eq!(updated.slug, "grey");

    let listed = catalog_service::list_entries(repo.as_ref(), CatalogKind::Color)
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].slug, "grey");
}

#[tokio::test]
async fn car_creation_validates_and_canonicalizes() {
    let repo = memory_repo();
    let reference = ReferenceData::builtin();
    catalog(&repo, CatalogKind::Make, "Skoda").await;
    catalog(&repo, CatalogKind::Color, "Green").await;

    let mut bad = car_request("skoda", "green");
    bad.name = " ".to_string();
    bad.year = 1800;
    bad.price = -1;
    bad.seats = Some(0);
    bad.fuel_type = "Steam".to_string();
    bad.status = Some("PARKED".to_string());
    let err = car_service::create_car(repo.as_ref(), &reference, bad)
        .await
        .expect_err("invalid car");
    match err {
        AppError::Validation(errors) => {
            for field in ["name", "year", "price", "seats", "fuelType", "status"] {
                assert!(errors.has_field(field), "missing error for {field}");
            }
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = car_service::create_car(repo.as_ref(), &reference, car_request("lada", "green"))
        .await
        .expect_err("unknown make");
    assert_eq!(err.to_string(), "Make 'lada' not found");

    let mut request = car_request("SKODA", "green");
    request.transmission = "manual".to_string();
    let car = car_service::create_car(repo.as_ref(), &reference, request)
        .await
        .expect("create");
    assert_eq!(car.make.slug, "skoda");
    assert_eq!(car.transmission, "Manual");
    assert_eq!(car.description.as_deref(), Some("Towbar, winter tyres"));
    assert_eq!(car.status, CarStatus::Available);

    let entries = repo.audit_entries().expect("audit");
    assert!(entries.iter().any(|e| e.action == "car_create" && e.resource == "cars"));
    assert!(!entries.iter().any(|e| e.action == "make_create"));
}

#[tokio::test]
async fn car_update_changes_only_given_fields() {
    let repo = memory_repo();
    let reference = ReferenceData::builtin();
    let make = catalog(&repo, CatalogKind::Make, "Seat").await;
    let color = catalog(&repo, CatalogKind::Color, "Orange").await;
    catalog(&repo, CatalogKind::Color, "Black").await;
    let mut car = new_car("Leon", &make, &color);
    car.description = Some("Sunroof".to_string());
    let car = add_car(&repo, car).await;

    let updated = car_service::update_car(
        repo.as_ref(),
        &reference,
        car.id,
        UpdateCarRequest {
            price: Some(9_500),
            color: Some("black".to_string()),
            description: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .expect("update");
    assert_eq!(updated.price, 9_500);
    assert_eq!(updated.color.slug, "black");
    assert_eq!(updated.description, None);
    assert_eq!(updated.name, "Leon");
    assert_eq!(updated.mileage, car.mileage);
    assert!(updated.updated_at > car.updated_at);

    let err = car_service::update_car(
        repo.as_ref(),
        &reference,
        car.id,
        UpdateCarRequest {
            mileage: Some(-10),
            ..Default::default()
        },
    )
    .await
    .expect_err("negative mileage");
    assert!(matches!(err, AppError::Validation(_)));

    let err = car_service::update_car(
        repo.as_ref(),
        &reference,
        uuid::Uuid::new_v4(),
        UpdateCarRequest::default(),
    )
    .await
    .expect_err("missing car");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn status_follows_the_lifecycle() {
    let repo = memory_repo();
    let make = catalog(&repo, CatalogKind::Make, "Opel").await;
    let color = catalog(&repo, CatalogKind::Color, "Yellow").await;
    let car = add_car(&repo, new_car("Corsa", &make, &color)).await;
    let status = |s: &str| UpdateCarStatusRequest { status: s.to_string() };

    let hidden = car_service::change_status(repo.as_ref(), car.id, status("UNAVAILABLE"))
        .await
        .expect("hide");
    assert_eq!(hidden.status, CarStatus::Unavailable);

    let same = car_service::change_status(repo.as_ref(), car.id, status("UNAVAILABLE"))
        .await
        .expect("no-op");
    assert_eq!(same.updated_at, hidden.updated_at);

    car_service::change_status(repo.as_ref(), car.id, status("AVAILABLE"))
        .await
        .expect("relist");
    car_service::change_status(repo.as_ref(), car.id, status("SOLD"))
        .await
        .expect("sell");

    let err = car_service::change_status(repo.as_ref(), car.id, status("AVAILABLE"))
        .await
        .expect_err("sold is final");
    assert!(matches!(err, AppError::Validation(_)));

    let err = car_service::change_status(repo.as_ref(), car.id, status("stolen"))
        .await
        .expect_err("unknown status");
    assert!(matches!(err, AppError::BadRequest(_)));

    let changes: Vec<_> = repo
        .audit_entries()
        .expect("audit")
        .into_iter()
        .filter(|e| e.action == "car_status_change")
        .collect();
    assert_eq!(changes.len(), 3);
}

#[tokio::test]
async fn status_write_only_applies_to_the_status_it_was_checked_against() {
    let repo = memory_repo();
    let make = catalog(&repo, CatalogKind::Make, "Mazda").await;
    let color = catalog(&repo, CatalogKind::Color, "Red").await;
    let car = add_car(&repo, new_car("MX-5", &make, &color)).await;

    // Two admins both read AVAILABLE; the first one sells the car.
    let sold = repo
        .set_car_status(car.id, CarStatus::Available, CarStatus::Sold)
        .await
        .expect("sell");
    assert_eq!(sold.map(|c| c.status), Some(CarStatus::Sold));

    let stale = repo
        .set_car_status(car.id, CarStatus::Available, CarStatus::Unavailable)
        .await
        .expect("stale write");
    assert!(stale.is_none());

    let stored = repo.get_car(car.id).await.expect("read").expect("car");
    assert_eq!(stored.status, CarStatus::Sold);
}

#[tokio::test]
async fn store_rejects_slug_change_once_referenced() {
    let repo = memory_repo();
    let make = catalog(&repo, CatalogKind::Make, "Peugeot").await;
    let color = catalog(&repo, CatalogKind::Color, "Blue").await;
    add_car(&repo, new_car("208", &make, &color)).await;

    let err = repo
        .update_entry(
            CatalogKind::Make,
            make.id,
            &NewCatalogEntry {
                name: "Peugeot".to_string(),
                slug: "pug".to_string(),
            },
        )
        .await
        .expect_err("referenced slug");
    assert!(matches!(err, AppError::Conflict(_)));

    let renamed = repo
        .update_entry(
            CatalogKind::Make,
            make.id,
            &NewCatalogEntry {
                name: "Peugeot SA".to_string(),
                slug: "peugeot".to_string(),
            },
        )
        .await
        .expect("rename keeps slug")
        .expect("entry");
    assert_eq!(renamed.slug, "peugeot");
}

#[tokio::test]
async fn sold_car_reports_terminal_status() {
    let repo = memory_repo();
    let make = catalog(&repo, CatalogKind::Make, "Saab").await;
    let color = catalog(&repo, CatalogKind::Color, "Black").await;
    let mut sold = new_car("9-3", &make, &color);
    sold.status = CarStatus::Sold;
    let car = add_car(&repo, sold).await;

    let err = car_service::change_status(
        repo.as_ref(),
        car.id,
        UpdateCarStatusRequest {
            status: "UNAVAILABLE".to_string(),
        },
    )
    .await
    .expect_err("sold is final");
    match err {
        AppError::Validation(errors) => {
            assert!(errors.to_string().contains("can no longer change"), "{errors}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
