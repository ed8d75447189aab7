use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::enums::CarStatus;

/// Which catalog table an entry lives in. Makes and colors share a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Make,
    Color,
}

impl CatalogKind {
    pub fn table(&self) -> &'static str {
        match self {
            CatalogKind::Make => "car_makes",
            CatalogKind::Color => "car_colors",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CatalogKind::Make => "make",
            CatalogKind::Color => "color",
        }
    }

    /// Capitalized label, used in not-found messages.
    pub fn title(&self) -> &'static str {
        match self {
            CatalogKind::Make => "Make",
            CatalogKind::Color => "Color",
        }
    }
}

/// A row of `car_makes` or `car_colors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub type CarMake = CatalogEntry;
pub type CarColor = CatalogEntry;

impl CatalogEntry {
    pub fn to_ref(&self) -> CatalogRef {
        CatalogRef {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Make or color as embedded in a car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub name: String,
    pub make: CatalogRef,
    pub color: CatalogRef,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub mileage: i64,
    pub fuel_type: String,
    pub transmission: String,
    pub body_type: String,
    pub seats: Option<i32>,
    pub description: Option<String>,
    pub status: CarStatus,
    pub featured: bool,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Age in whole years relative to `current_year`; future model years count as 0.
    pub fn age(&self, current_year: i32) -> i64 {
        (i64::from(current_year) - i64::from(self.year)).max(0)
    }

    pub fn is_available(&self) -> bool {
        self.status == CarStatus::Available
    }
}

/// Insert payload for a car after make/color slugs have been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub name: String,
    pub make_id: Uuid,
    pub color_id: Uuid,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub mileage: i64,
    pub fuel_type: String,
    pub transmission: String,
    pub body_type: String,
    pub seats: Option<i32>,
    pub description: Option<String>,
    pub status: CarStatus,
    pub featured: bool,
    pub images: Vec<String>,
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarChanges {
    pub name: Option<String>,
    pub make_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<i64>,
    pub mileage: Option<i64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub seats: Option<Option<i32>>,
    pub description: Option<Option<String>>,
    pub status: Option<CarStatus>,
    pub featured: Option<bool>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCatalogEntry {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub resource: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
