//! Catalog administration. These routes carry no authentication of their
//! own and are expected to sit behind the operator's gateway.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post, put},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::{
        cars::{CreateCarRequest, UpdateCarRequest, UpdateCarStatusRequest},
        catalog::{CatalogList, CreateCatalogEntryRequest, UpdateCatalogEntryRequest},
    },
    error::AppResult,
    models::{Car, CatalogEntry, CatalogKind},
    response::ActionResponse,
    routes::extract::{IdPath, JsonBody},
    services::{car_service, catalog_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/makes", get(list_makes).post(create_make))
        .route("/makes/{id}", put(update_make).delete(delete_make))
        .route("/colors", get(list_colors).post(create_color))
        .route("/colors/{id}", put(update_color).delete(delete_color))
        .route("/cars", post(create_car))
        .route("/cars/{id}", put(update_car).delete(delete_car))
        .route("/cars/{id}/status", patch(update_car_status))
}

type Created<T> = (StatusCode, Json<ActionResponse<T>>);

async fn list(state: &AppState, kind: CatalogKind) -> AppResult<Json<ActionResponse<CatalogList>>> {
    let items = catalog_service::list_entries(state.repo.as_ref(), kind).await?;
    Ok(Json(ActionResponse::success(CatalogList { items })))
}

async fn create(
    state: &AppState,
    kind: CatalogKind,
    payload: CreateCatalogEntryRequest,
) -> AppResult<Created<CatalogEntry>> {
    let entry = catalog_service::create_entry(state.repo.as_ref(), kind, payload).await?;
    Ok((StatusCode::CREATED, Json(ActionResponse::success(entry))))
}

async fn update(
    state: &AppState,
    kind: CatalogKind,
    id: Uuid,
    payload: UpdateCatalogEntryRequest,
) -> AppResult<Json<ActionResponse<CatalogEntry>>> {
    let entry = catalog_service::update_entry(state.repo.as_ref(), kind, id, payload).await?;
    Ok(Json(ActionResponse::success(entry)))
}

async fn delete(
    state: &AppState,
    kind: CatalogKind,
    id: Uuid,
) -> AppResult<Json<ActionResponse<serde_json::Value>>> {
    catalog_service::delete_entry(state.repo.as_ref(), kind, id).await?;
    Ok(Json(ActionResponse::success(json!({ "id": id }))))
}

#[utoipa::path(
    get,
    path = "/api/admin/makes",
    responses(
        (status = 200, description = "All makes", body = ActionResponse<CatalogList>),
    ),
    tag = "Admin"
)]
pub async fn list_makes(State(state): State<AppState>) -> AppResult<Json<ActionResponse<CatalogList>>> {
    list(&state, CatalogKind::Make).await
}

#[utoipa::path(
    post,
    path = "/api/admin/makes",
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 201, description = "Make created", body = ActionResponse<CatalogEntry>),
        (status = 400, description = "Invalid name or slug"),
        (status = 409, description = "Slug already taken"),
    ),
    tag = "Admin"
)]
pub async fn create_make(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCatalogEntryRequest>,
) -> AppResult<Created<CatalogEntry>> {
    create(&state, CatalogKind::Make, payload).await
}

#[utoipa::path(
    put,
    path = "/api/admin/makes/{id}",
    params(
        ("id" = Uuid, Path, description = "Make ID")
    ),
    request_body = UpdateCatalogEntryRequest,
    responses(
        (status = 200, description = "Make updated", body = ActionResponse<CatalogEntry>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Slug taken or make still referenced"),
    ),
    tag = "Admin"
)]
pub async fn update_make(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateCatalogEntryRequest>,
) -> AppResult<Json<ActionResponse<CatalogEntry>>> {
    update(&state, CatalogKind::Make, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/makes/{id}",
    params(
        ("id" = Uuid, Path, description = "Make ID")
    ),
    responses(
        (status = 200, description = "Make deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Make still referenced by cars"),
    ),
    tag = "Admin"
)]
pub async fn delete_make(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ActionResponse<serde_json::Value>>> {
    delete(&state, CatalogKind::Make, id).await
}

#[utoipa::path(
    get,
    path = "/api/admin/colors",
    responses(
        (status = 200, description = "All colors", body = ActionResponse<CatalogList>),
    ),
    tag = "Admin"
)]
pub async fn list_colors(State(state): State<AppState>) -> AppResult<Json<ActionResponse<CatalogList>>> {
    list(&state, CatalogKind::Color).await
}

#[utoipa::path(
    post,
    path = "/api/admin/colors",
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 201, description = "Color created", body = ActionResponse<CatalogEntry>),
        (status = 400, description = "Invalid name or slug"),
        (status = 409, description = "Slug already taken"),
    ),
    tag = "Admin"
)]
pub async fn create_color(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCatalogEntryRequest>,
) -> AppResult<Created<CatalogEntry>> {
    create(&state, CatalogKind::Color, payload).await
}

#[utoipa::path(
    put,
    path = "/api/admin/colors/{id}",
    params(
        ("id" = Uuid, Path, description = "Color ID")
    ),
    request_body = UpdateCatalogEntryRequest,
    responses(
        (status = 200, description = "Color updated", body = ActionResponse<CatalogEntry>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Slug taken or color still referenced"),
    ),
    tag = "Admin"
)]
pub async fn update_color(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateCatalogEntryRequest>,
) -> AppResult<Json<ActionResponse<CatalogEntry>>> {
    update(&state, CatalogKind::Color, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/colors/{id}",
    params(
        ("id" = Uuid, Path, description = "Color ID")
    ),
    responses(
        (status = 200, description = "Color deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Color still referenced by cars"),
    ),
    tag = "Admin"
)]
pub async fn delete_color(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ActionResponse<serde_json::Value>>> {
    delete(&state, CatalogKind::Color, id).await
}

#[utoipa::path(
    post,
    path = "/api/admin/cars",
    request_body = CreateCarRequest,
    responses(
        (status = 201, description = "Car created", body = ActionResponse<Car>),
        (status = 400, description = "Invalid car"),
        (status = 404, description = "Unknown make or color"),
    ),
    tag = "Admin"
)]
pub async fn create_car(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCarRequest>,
) -> AppResult<Created<Car>> {
    let car = car_service::create_car(state.repo.as_ref(), &state.reference, payload).await?;
    Ok((StatusCode::CREATED, Json(ActionResponse::success(car))))
}

#[utoipa::path(
    put,
    path = "/api/admin/cars/{id}",
    params(
        ("id" = Uuid, Path, description = "Car ID")
    ),
    request_body = UpdateCarRequest,
    responses(
        (status = 200, description = "Car updated", body = ActionResponse<Car>),
        (status = 400, description = "Invalid car"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Admin"
)]
pub async fn update_car(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateCarRequest>,
) -> AppResult<Json<ActionResponse<Car>>> {
    let car = car_service::update_car(state.repo.as_ref(), &state.reference, id, payload).await?;
    Ok(Json(ActionResponse::success(car)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/cars/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Car ID")
    ),
    request_body = UpdateCarStatusRequest,
    responses(
        (status = 200, description = "Update car status", body = ActionResponse<Car>),
        (status = 400, description = "Invalid status or transition"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Admin"
)]
pub async fn update_car_status(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateCarStatusRequest>,
) -> AppResult<Json<ActionResponse<Car>>> {
    let car = car_service::change_status(state.repo.as_ref(), id, payload).await?;
    Ok(Json(ActionResponse::success(car)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/cars/{id}",
    params(
        ("id" = Uuid, Path, description = "Car ID")
    ),
    responses(
        (status = 200, description = "Car deleted"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Admin"
)]
pub async fn delete_car(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ActionResponse<serde_json::Value>>> {
    car_service::delete_car(state.repo.as_ref(), id).await?;
    Ok(Json(ActionResponse::success(json!({ "id": id }))))
}
