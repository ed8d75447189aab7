use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Car;

/// Inclusive `[min, max]` over observed values. An empty input yields `{0, 0}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NumericRange {
    pub min: i64,
    pub max: i64,
}

impl NumericRange {
    pub fn from_values(values: impl IntoIterator<Item = i64>) -> Self {
        values
            .into_iter()
            .fold(None, |acc: Option<NumericRange>, v| match acc {
                None => Some(NumericRange { min: v, max: v }),
                Some(r) => Some(NumericRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
            .unwrap_or_default()
    }

    /// Builds a range from SQL `MIN`/`MAX` results, which are NULL over zero rows.
    pub fn from_bounds(min: Option<i64>, max: Option<i64>) -> Self {
        match (min, max) {
            (Some(min), Some(max)) if min <= max => NumericRange { min, max },
            _ => NumericRange::default(),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Age range implied by the oldest and newest model years on offer.
pub fn age_range_from_years(
    min_year: Option<i32>,
    max_year: Option<i32>,
    current_year: i32,
) -> NumericRange {
    let age = |year: i32| (i64::from(current_year) - i64::from(year)).max(0);
    match (min_year, max_year) {
        (Some(oldest), Some(newest)) => NumericRange::from_values([age(newest), age(oldest)]),
        _ => NumericRange::default(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct CatalogOption {
    pub name: String,
    pub slug: String,
}

/// Live snapshot of the filter values that can currently match something.
///
/// Only `AVAILABLE` cars contribute: sold or hidden listings would offer
/// options that always return zero results and would skew the ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarFiltersData {
    pub makes: Vec<CatalogOption>,
    pub colors: Vec<CatalogOption>,
    pub body_types: Vec<String>,
    pub fuel_types: Vec<String>,
    pub transmissions: Vec<String>,
    pub price_range: NumericRange,
    pub mileage_range: NumericRange,
    pub age_range: NumericRange,
}

impl CarFiltersData {
    pub fn from_inventory<'a, I>(cars: I, current_year: i32) -> Self
    where
        I: IntoIterator<Item = &'a Car>,
    {
        let mut makes = BTreeSet::new();
        let mut colors = BTreeSet::new();
        let mut body_types = BTreeSet::new();
        let mut fuel_types = BTreeSet::new();
        let mut transmissions = BTreeSet::new();
        let mut prices = Vec::new();
        let mut mileages = Vec::new();
        let mut ages = Vec::new();

        for car in cars.into_iter().filter(|car| car.is_available()) {
            makes.insert(CatalogOption {
                name: car.make.name.clone(),
                slug: car.make.slug.clone(),
            });
            colors.insert(CatalogOption {
                name: car.color.name.clone(),
                slug: car.color.slug.clone(),
            });
            body_types.insert(car.body_type.clone());
            fuel_types.insert(car.fuel_type.clone());
            transmissions.insert(car.transmission.clone());
            prices.push(car.price);
            mileages.push(car.mileage);
            ages.push(car.age(current_year));
        }

        Self {
            makes: makes.into_iter().collect(),
            colors: colors.into_iter().collect(),
            body_types: body_types.into_iter().collect(),
            fuel_types: fuel_types.into_iter().collect(),
            transmissions: transmissions.into_iter().collect(),
            price_range: NumericRange::from_values(prices),
            mileage_range: NumericRange::from_values(mileages),
            age_range: NumericRange::from_values(ages),
        }
    }

    pub fn find_make(&self, slug: &str) -> Option<&CatalogOption> {
        find_option(&self.makes, slug)
    }

    pub fn find_color(&self, slug: &str) -> Option<&CatalogOption> {
        find_option(&self.colors, slug)
    }

    pub fn find_body_type(&self, value: &str) -> Option<&str> {
        find_value(&self.body_types, value)
    }

    pub fn find_fuel_type(&self, value: &str) -> Option<&str> {
        find_value(&self.fuel_types, value)
    }

    pub fn find_transmission(&self, value: &str) -> Option<&str> {
        find_value(&self.transmissions, value)
    }
}

fn find_option<'a>(options: &'a [CatalogOption], slug: &str) -> Option<&'a CatalogOption> {
    options.iter().find(|o| o.slug.eq_ignore_ascii_case(slug))
}

fn find_value<'a>(values: &'a [String], value: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|v| v.eq_ignore_ascii_case(value))
        .map(String::as_str)
}
