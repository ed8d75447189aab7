#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use car_marketplace_api::{
    enums::CarStatus,
    filters::{PageLimits, RawCarFilters},
    models::{Car, CatalogEntry, CatalogKind, NewCar, NewCatalogEntry},
    reference::ReferenceData,
    repository::{CarWriter, CatalogWriter, InMemoryRepository},
    routes::create_app,
    services::current_year,
    slug::slugify,
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub fn memory_repo() -> Arc<InMemoryRepository> {
    Arc::new(InMemoryRepository::new())
}

pub async fn catalog(repo: &InMemoryRepository, kind: CatalogKind, name: &str) -> CatalogEntry {
    repo.insert_entry(
        kind,
        &NewCatalogEntry {
            name: name.to_string(),
            slug: slugify(name),
        },
    )
    .await
    .expect("insert catalog entry")
}

/// A three-year-old petrol sedan at 10,000 with 50,000 km.
pub fn new_car(name: &str, make: &CatalogEntry, color: &CatalogEntry) -> NewCar {
    NewCar {
        name: name.to_string(),
        make_id: make.id,
        color_id: color.id,
        model: "Base".to_string(),
        year: current_year() - 3,
        price: 10_000,
        mileage: 50_000,
        fuel_type: "Petrol".to_string(),
        transmission: "Manual".to_string(),
        body_type: "Sedan".to_string(),
        seats: Some(5),
        description: None,
        status: CarStatus::Available,
        featured: false,
        images: Vec::new(),
    }
}

pub async fn add_car(repo: &InMemoryRepository, car: NewCar) -> Car {
    repo.insert_car(&car).await.expect("insert car")
}

pub fn raw(query: &str) -> RawCarFilters {
    RawCarFilters::from_query_string(query).expect("query string")
}

pub fn test_app(repo: Arc<InMemoryRepository>) -> Router {
    let state = AppState::new(repo, ReferenceData::builtin(), PageLimits::default());
    create_app(state)
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}
