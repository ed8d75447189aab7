mod common;

use axum::http::StatusCode;
use car_marketplace_api::{enums::CarStatus, models::CatalogKind};
use serde_json::json;

use common::{add_car, catalog, get, json_request, memory_repo, new_car, send, test_app};

#[tokio::test]
async fn health_and_unknown_routes_use_the_envelope() {
    let app = test_app(memory_repo());

    let (status, body) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = send(app, get("/api/trucks")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
    assert_eq!(body["error"], "/api/trucks not found");
}

#[tokio::test]
async fn search_returns_items_and_pagination() {
    let repo = memory_repo();
    let make = catalog(&repo, CatalogKind::Make, "Mazda").await;
    let color = catalog(&repo, CatalogKind::Color, "Soul Red").await;
    for i in 0..3 {
        let mut car = new_car(&format!("MX-5 #{i}"), &make, &color);
        car.price = 20_000 + i * 1_000;
        add_car(&repo, car).await;
    }
    let app = test_app(repo);

    let (status, body) = send(app, get("/api/cars?make=mazda&sortBy=priceDesc&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["pagination"], json!({ "total": 3, "page": 1, "limit": 2, "pages": 2 }));
    let items = body["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["price"], 22_000);
    assert_eq!(items[0]["make"]["slug"], "mazda");
    assert_eq!(items[0]["color"]["slug"], "soul-red");
    assert_eq!(items[0]["status"], "AVAILABLE");
}

#[tokio::test]
async fn invalid_filters_are_a_bad_request() {
    let app = test_app(memory_repo());

    let (status, body) = send(app.clone(), get("/api/cars?minPrice=abc&maxPrice=10")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("minPrice"), "{message}");

    let (status, _) = send(app, get("/api/cars?sortBy=random")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filters_endpoint_reports_the_snapshot() {
    let repo = memory_repo();
    let make = catalog(&repo, CatalogKind::Make, "Audi").await;
    let color = catalog(&repo, CatalogKind::Color, "Black").await;
    add_car(&repo, new_car("A4", &make, &color)).await;
    let app = test_app(repo);

    let (status, body) = send(app, get("/api/cars/filters")).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["makes"], json!([{ "name": "Audi", "slug": "audi" }]));
    assert_eq!(data["priceRange"], json!({ "min": 10_000, "max": 10_000 }));
    assert_eq!(data["bodyTypes"], json!(["Sedan"]));
}

#[tokio::test]
async fn car_lookup_by_id() {
    let repo = memory_repo();
    let make = catalog(&repo, CatalogKind::Make, "Audi").await;
    let color = catalog(&repo, CatalogKind::Color, "Black").await;
    let car = add_car(&repo, new_car("A6", &make, &color)).await;
    let app = test_app(repo);

    let (status, body) = send(app.clone(), get(&format!("/api/cars/{}", car.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "A6");

    let (status, body) = send(app.clone(), get(&format!("/api/cars/{}", uuid::Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Car not found");

    let (status, body) = send(app, get("/api/cars/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn reference_tables_are_served() {
    let app = test_app(memory_repo());

    let (status, body) = send(app.clone(), get("/api/reference/body-types")).await;
    assert_eq!(status, StatusCode::OK);
    let body_types = body["data"].as_array().expect("body types");
    assert!(body_types.iter().any(|b| b["slug"] == "suv"));

    let (status, body) = send(app, get("/api/reference")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["workingHours"].as_array().map(Vec::len), Some(7));
    assert!(body["data"]["fuelTypes"].as_array().is_some_and(|f| !f.is_empty()));
}

#[tokio::test]
async fn admin_creates_catalog_and_cars() {
    let repo = memory_repo();
    let app = test_app(repo.clone());

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/api/admin/makes", json!({ "name": "Alfa Romeo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "alfa-romeo");

    let (status, _) = send(
        app.clone(),
        json_request("POST", "/api/admin/colors", json!({ "name": "Rosso", "slug": "Rosso Corsa" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/api/admin/makes", json!({ "name": "ALFA romeo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        app.clone(),
        json_request(
            "POST",
            "/api/admin/cars",
            json!({
                "name": "Giulia Veloce",
                "make": "alfa-romeo",
                "color": "rosso-corsa",
                "model": "Giulia",
                "year": 2020,
                "price": 33_000,
                "mileage": 41_000,
                "fuelType": "petrol",
                "transmission": "automatic",
                "bodyType": "sedan",
                "seats": 5
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["bodyType"], "Sedan");
    assert_eq!(body["data"]["fuelType"], "Petrol");
    assert_eq!(body["data"]["status"], "AVAILABLE");
    let car_id = body["data"]["id"].as_str().expect("car id").to_string();

    let (status, body) = send(
        app.clone(),
        json_request(
            "PATCH",
            &format!("/api/admin/cars/{car_id}/status"),
            json!({ "status": "SOLD" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "SOLD");

    let (status, body) = send(
        app.clone(),
        json_request(
            "PATCH",
            &format!("/api/admin/cars/{car_id}/status"),
            json!({ "status": "AVAILABLE" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, body) = send(app, get("/api/cars")).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);

    let car = repo
        .audit_entries()
        .expect("audit")
        .into_iter()
        .find(|entry| entry.action == "car_status_change")
        .expect("status change audited");
    assert_eq!(car.metadata["to"], json!(CarStatus::Sold));
}

#[tokio::test]
async fn malformed_json_gets_the_failure_envelope() {
    let app = test_app(memory_repo());
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/admin/makes")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"name\":"))
        .expect("request");

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn oversized_body_gets_the_failure_envelope() {
    let app = test_app(memory_repo());
    let payload = format!("{{\"name\":\"{}\"}}", "x".repeat(2 * 1024 * 1024));
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/admin/makes")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(axum::body::Body::from(payload))
        .expect("request");

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("exceeds")));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    use tower::ServiceExt;

    let app = test_app(memory_repo());
    let response = app.oneshot(get("/health")).await.expect("response");
    assert!(response.headers().contains_key("x-request-id"));
}
