use axum::{Json, Router, extract::State, routing::get};
use uuid::Uuid;

use crate::{
    dto::cars::CarList,
    error::AppResult,
    filters::{CarFiltersData, RawCarFilters},
    models::Car,
    response::ActionResponse,
    routes::extract::{FilterQuery, IdPath},
    services::car_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_cars))
        .route("/filters", get(filter_options))
        .route("/{id}", get(get_car))
}

#[utoipa::path(
    get,
    path = "/api/cars",
    params(RawCarFilters),
    responses(
        (status = 200, description = "Matching available cars", body = ActionResponse<CarList>),
        (status = 400, description = "Invalid filters"),
        (status = 500, description = "Internal Server Error"),
    ),
    tag = "Cars"
)]
pub async fn search_cars(
    State(state): State<AppState>,
    FilterQuery(raw): FilterQuery,
) -> AppResult<Json<ActionResponse<CarList>>> {
    let list = car_service::search_cars(state.repo.as_ref(), &raw, state.limits).await?;
    Ok(Json(ActionResponse::success(list)))
}

#[utoipa::path(
    get,
    path = "/api/cars/filters",
    responses(
        (status = 200, description = "Filter options over available cars", body = ActionResponse<CarFiltersData>),
    ),
    tag = "Cars"
)]
pub async fn filter_options(
    State(state): State<AppState>,
) -> AppResult<Json<ActionResponse<CarFiltersData>>> {
    let options = car_service::filter_options(state.repo.as_ref()).await?;
    Ok(Json(ActionResponse::success(options)))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    params(
        ("id" = Uuid, Path, description = "Car ID")
    ),
    responses(
        (status = 200, description = "Get car", body = ActionResponse<Car>),
        (status = 404, description = "Car not found"),
    ),
    tag = "Cars"
)]
pub async fn get_car(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ActionResponse<Car>>> {
    let car = car_service::get_car(state.repo.as_ref(), id).await?;
    Ok(Json(ActionResponse::success(car)))
}
