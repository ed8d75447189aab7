use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::ActionResponse;

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ActionResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ActionResponse<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
    };

    Json(ActionResponse::success(data))
}
