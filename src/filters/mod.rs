//! Search filters for the public car listing.
//!
//! Query strings arrive as [`RawCarFilters`] (every value still a string) and
//! are turned into a [`CarFilters`] by [`normalize`], which checks numbers,
//! page controls and sort order, and resolves categorical values against the
//! live [`CarFiltersData`] snapshot.

pub mod options;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::validation::ValidationErrors;

pub use options::{CarFiltersData, CatalogOption, NumericRange};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// Largest numeric bound accepted, so bounds always fit the `BIGINT` columns.
const MAX_BOUND: u64 = i64::MAX as u64;

/// Page-size policy for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl PageLimits {
    pub fn new(default_limit: u64, max_limit: u64) -> anyhow::Result<Self> {
        if max_limit == 0 {
            anyhow::bail!("max page size must be at least 1");
        }
        if default_limit == 0 || default_limit > max_limit {
            anyhow::bail!("default page size must be between 1 and {max_limit}");
        }
        Ok(Self {
            default_limit,
            max_limit,
        })
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::Newest, SortBy::PriceAsc, SortBy::PriceDesc];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::PriceAsc => "priceAsc",
            SortBy::PriceDesc => "priceDesc",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| "must be one of newest, priceAsc, priceDesc".to_string())
    }
}

/// Search parameters exactly as they appear in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RawCarFilters {
    /// Case-insensitive text matched against name and description.
    pub search: Option<String>,
    /// Make slug.
    pub make: Option<String>,
    /// Color slug.
    pub color: Option<String>,
    pub body_type: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_mileage: Option<String>,
    pub max_mileage: Option<String>,
    /// Minimum age in years.
    pub min_age: Option<String>,
    /// Maximum age in years.
    pub max_age: Option<String>,
    /// One of `newest`, `priceAsc`, `priceDesc`. Defaults to `newest`.
    pub sort_by: Option<String>,
    /// 1-based page number. Defaults to 1.
    pub page: Option<String>,
    /// Page size, clamped to the configured maximum.
    pub limit: Option<String>,
}

impl RawCarFilters {
    pub fn from_query_string(query: &str) -> Result<Self, ValidationErrors> {
        serde_urlencoded::from_str(query)
            .map_err(|err| ValidationErrors::single("query", format!("malformed query string: {err}")))
    }

    /// Whether any value has to be checked against the filter options snapshot.
    pub fn has_categorical(&self) -> bool {
        [
            &self.make,
            &self.color,
            &self.body_type,
            &self.fuel_type,
            &self.transmission,
        ]
        .into_iter()
        .any(|value| present(value).is_some())
    }
}

/// A validated filter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_mileage: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mileage: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    pub sort_by: SortBy,
    pub page: u64,
    pub limit: u64,
}

impl Default for CarFilters {
    fn default() -> Self {
        Self {
            search: None,
            make: None,
            color: None,
            body_type: None,
            fuel_type: None,
            transmission: None,
            min_price: None,
            max_price: None,
            min_mileage: None,
            max_mileage: None,
            min_age: None,
            max_age: None,
            sort_by: SortBy::Newest,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl CarFilters {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn to_query_string(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(self)
    }

    /// Translates age bounds into `(min_year, max_year)` model-year bounds.
    ///
    /// Ages are clamped at 0, so next year's models count as age 0 and
    /// `minAge=0` puts no upper bound on the model year.
    pub fn year_bounds(&self, current_year: i32) -> (Option<i32>, Option<i32>) {
        let year_for_age = |age: u64| {
            let age = i64::try_from(age).unwrap_or(i64::MAX);
            let year = i64::from(current_year).saturating_sub(age);
            i32::try_from(year).unwrap_or(i32::MIN)
        };
        (
            self.max_age.map(year_for_age),
            self.min_age.filter(|age| *age > 0).map(year_for_age),
        )
    }
}

/// Validates and normalizes raw filters.
///
/// Every invalid field is reported. Categorical values must exist in
/// `options` and are rewritten to the snapshot's canonical spelling.
pub fn normalize(
    raw: &RawCarFilters,
    options: &CarFiltersData,
    limits: PageLimits,
) -> Result<CarFilters, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let search = present(&raw.search).map(str::to_string);

    let make = present(&raw.make).and_then(|value| match options.find_make(value) {
        Some(option) => Some(option.slug.clone()),
        None => {
            errors.add("make", format!("unknown make '{value}'"));
            None
        }
    });
    let color = present(&raw.color).and_then(|value| match options.find_color(value) {
        Some(option) => Some(option.slug.clone()),
        None => {
            errors.add("color", format!("unknown color '{value}'"));
            None
        }
    });
    let body_type = categorical(
        &mut errors,
        "bodyType",
        "body type",
        &raw.body_type,
        |v| options.find_body_type(v),
    );
    let fuel_type = categorical(
        &mut errors,
        "fuelType",
        "fuel type",
        &raw.fuel_type,
        |v| options.find_fuel_type(v),
    );
    let transmission = categorical(
        &mut errors,
        "transmission",
        "transmission",
        &raw.transmission,
        |v| options.find_transmission(v),
    );

    let min_price = bound(&mut errors, "minPrice", &raw.min_price);
    let max_price = bound(&mut errors, "maxPrice", &raw.max_price);
    let min_mileage = bound(&mut errors, "minMileage", &raw.min_mileage);
    let max_mileage = bound(&mut errors, "maxMileage", &raw.max_mileage);
    let min_age = bound(&mut errors, "minAge", &raw.min_age);
    let max_age = bound(&mut errors, "maxAge", &raw.max_age);

    ordered_pair(&mut errors, ("minPrice", min_price), ("maxPrice", max_price));
    ordered_pair(&mut errors, ("minMileage", min_mileage), ("maxMileage", max_mileage));
    ordered_pair(&mut errors, ("minAge", min_age), ("maxAge", max_age));

    let sort_by = match present(&raw.sort_by) {
        None => SortBy::default(),
        Some(value) => value.parse().unwrap_or_else(|message: String| {
            errors.add("sortBy", message);
            SortBy::default()
        }),
    };

    let limit = match present(&raw.limit).map(parse_control) {
        None => limits.default_limit,
        Some(Ok(limit)) => (limit.max(1) as u64).min(limits.max_limit),
        Some(Err(())) => {
            errors.add("limit", "must be a whole number");
            limits.default_limit
        }
    };

    let page = match present(&raw.page).map(parse_control) {
        None => 1,
        Some(Ok(page)) => (page.max(1) as u64).min(max_page(limit)),
        Some(Err(())) => {
            errors.add("page", "must be a whole number");
            1
        }
    };

    errors.into_result(CarFilters {
        search,
        make,
        color,
        body_type,
        fuel_type,
        transmission,
        min_price,
        max_price,
        min_mileage,
        max_mileage,
        min_age,
        max_age,
        sort_by,
        page,
        limit,
    })
}

/// Empty and whitespace-only values are treated as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn categorical<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: &Option<String>,
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> Option<String> {
    let value = present(value)?;
    match lookup(value) {
        Some(canonical) => Some(canonical.to_string()),
        None => {
            errors.add(field, format!("unknown {label} '{value}'"));
            None
        }
    }
}

fn bound(errors: &mut ValidationErrors, field: &str, value: &Option<String>) -> Option<u64> {
    let value = present(value)?;
    if let Ok(n) = value.parse::<u64>() {
        if n > MAX_BOUND {
            errors.add(field, "is too large");
            return None;
        }
        return Some(n);
    }

    match value.parse::<f64>() {
        Err(_) => errors.add(field, "must be a number"),
        Ok(n) if !n.is_finite() => errors.add(field, "must be a finite number"),
        Ok(n) if n < 0.0 => errors.add(field, "must not be negative"),
        Ok(n) if n.fract() != 0.0 => errors.add(field, "must be a whole number"),
        // whole values written as `1e3` or `500.0`
        Ok(n) if n <= 9_007_199_254_740_992.0 => return Some(n as u64),
        Ok(_) => errors.add(field, "is too large"),
    }
    None
}

fn ordered_pair(
    errors: &mut ValidationErrors,
    (min_field, min): (&str, Option<u64>),
    (max_field, max): (&str, Option<u64>),
) {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            errors.add(
                min_field,
                format!("must not be greater than {max_field} ({min} > {max})"),
            );
        }
    }
}

/// Highest page whose offset still fits a `BIGINT`.
fn max_page(limit: u64) -> u64 {
    MAX_BOUND / limit.max(1) + 1
}

/// Page controls only need to be integers; out-of-range values are clamped.
fn parse_control(value: &str) -> Result<i64, ()> {
    value.parse::<i64>().map_err(|_| ())
}
