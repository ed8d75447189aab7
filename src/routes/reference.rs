use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    reference::{BodyType, ReferenceData},
    response::ActionResponse,
    state::AppState,
};

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct BodyTypeList {
    #[schema(value_type = Vec<BodyType>)]
    pub items: Vec<BodyType>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reference_data))
        .route("/body-types", get(body_types))
}

#[utoipa::path(
    get,
    path = "/api/reference",
    responses(
        (status = 200, description = "Body types, fuel types, transmissions and working hours", body = ActionResponse<ReferenceData>),
    ),
    tag = "Reference"
)]
pub async fn reference_data(State(state): State<AppState>) -> Json<ActionResponse<ReferenceData>> {
    Json(ActionResponse::success(state.reference.as_ref().clone()))
}

#[utoipa::path(
    get,
    path = "/api/reference/body-types",
    responses(
        (status = 200, description = "Body type table", body = ActionResponse<BodyTypeList>),
    ),
    tag = "Reference"
)]
pub async fn body_types(State(state): State<AppState>) -> Json<ActionResponse<BodyTypeList>> {
    Json(ActionResponse::success(BodyTypeList {
        items: state.reference.body_types.clone(),
    }))
}
