use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{models::CatalogEntry, validation::not_blank};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateCatalogEntryRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateCatalogEntryRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CatalogList {
    #[schema(value_type = Vec<CatalogEntry>)]
    pub items: Vec<CatalogEntry>,
}
