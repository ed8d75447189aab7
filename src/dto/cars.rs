use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    models::Car,
    response::PaginationInfo,
    validation::{model_year, not_blank},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct CarList {
    pub items: Vec<Car>,
    pub pagination: PaginationInfo,
}

/// Make and color are given by slug.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub make: String,
    pub color: String,
    #[validate(custom(function = "not_blank"))]
    pub model: String,
    #[validate(custom(function = "model_year"))]
    pub year: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub mileage: i64,
    pub fuel_type: String,
    pub transmission: String,
    pub body_type: String,
    #[validate(range(min = 1, max = 99, message = "must be between 1 and 99"))]
    pub seats: Option<i32>,
    pub description: Option<String>,
    /// Defaults to `AVAILABLE`.
    pub status: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub make: Option<String>,
    pub color: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub model: Option<String>,
    #[validate(custom(function = "model_year"))]
    pub year: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: Option<i64>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub mileage: Option<i64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    #[validate(range(min = 1, max = 99, message = "must be between 1 and 99"))]
    pub seats: Option<i32>,
    pub description: Option<String>,
    pub featured: Option<bool>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCarStatusRequest {
    /// `AVAILABLE`, `SOLD` or `UNAVAILABLE`.
    pub status: String,
}
