use std::{collections::HashSet, path::Path};

use anyhow::Context;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    enums::DayOfWeek,
    schedule::{DayHours, WeeklySchedule},
    slug::is_valid_slug,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BodyType {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Read-only lookup tables, loaded once at startup and shared through
/// application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    pub body_types: Vec<BodyType>,
    pub fuel_types: Vec<String>,
    pub transmissions: Vec<String>,
    #[schema(value_type = Vec<DayHours>)]
    pub working_hours: WeeklySchedule,
}

impl ReferenceData {
    /// Loads the table from a JSON file when a path is configured, otherwise
    /// falls back to the built-in table.
    pub async fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading reference data from {}", path.display()))?;
                let data = Self::from_json(&raw)?;
                tracing::info!(path = %path.display(), body_types = data.body_types.len(), "reference data loaded");
                Ok(data)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let data: ReferenceData = serde_json::from_str(raw).context("parsing reference data")?;
        data.validate()?;
        Ok(data)
    }

    pub fn builtin() -> Self {
        let body_type = |name: &str, slug: &str| BodyType {
            name: name.to_string(),
            slug: slug.to_string(),
            image: Some(format!("/body/{slug}.webp")),
        };
        let at = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or_default();
        let working_hours = DayOfWeek::ALL
            .into_iter()
            .map(|day| DayHours {
                day_of_week: day,
                open_time: at(9),
                close_time: at(if day == DayOfWeek::Saturday { 16 } else { 18 }),
                is_open: day != DayOfWeek::Sunday,
            })
            .collect();

        Self {
            body_types: vec![
                body_type("SUV", "suv"),
                body_type("Sedan", "sedan"),
                body_type("Hatchback", "hatchback"),
                body_type("Convertible", "convertible"),
                body_type("Coupe", "coupe"),
                body_type("Wagon", "wagon"),
                body_type("Pickup", "pickup"),
                body_type("Van", "van"),
            ],
            fuel_types: ["Petrol", "Diesel", "Electric", "Hybrid", "Plug-in Hybrid"]
                .map(String::from)
                .to_vec(),
            transmissions: ["Automatic", "Manual", "Semi-Automatic"]
                .map(String::from)
                .to_vec(),
            // the built-in hours are a complete week, so this cannot fail
            working_hours: WeeklySchedule::new(working_hours)
                .unwrap_or_else(|_| unreachable!("built-in schedule covers every day once")),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.body_types.is_empty() {
            anyhow::bail!("reference data must list at least one body type");
        }
        let mut slugs = HashSet::new();
        for body_type in &self.body_types {
            if !is_valid_slug(&body_type.slug) {
                anyhow::bail!("body type '{}' has invalid slug '{}'", body_type.name, body_type.slug);
            }
            if !slugs.insert(body_type.slug.as_str()) {
                anyhow::bail!("body type slug '{}' is listed twice", body_type.slug);
            }
        }
        for (label, values) in [("fuel type", &self.fuel_types), ("transmission", &self.transmissions)] {
            let mut seen = HashSet::new();
            for value in values {
                if value.trim().is_empty() || !seen.insert(value.to_lowercase()) {
                    anyhow::bail!("{label} list contains a blank or duplicate entry '{value}'");
                }
            }
        }
        Ok(())
    }

    /// Matches by name or slug, ignoring case.
    pub fn body_type(&self, value: &str) -> Option<&BodyType> {
        self.body_types
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(value) || b.slug.eq_ignore_ascii_case(value))
    }

    pub fn fuel_type(&self, value: &str) -> Option<&str> {
        self.fuel_types
            .iter()
            .find(|f| f.eq_ignore_ascii_case(value))
            .map(String::as_str)
    }

    pub fn transmission(&self, value: &str) -> Option<&str> {
        self.transmissions
            .iter()
            .find(|t| t.eq_ignore_ascii_case(value))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let data = ReferenceData::builtin();
        data.validate().unwrap();
        assert_eq!(data.body_type("suv").unwrap().name, "SUV");
        assert_eq!(data.body_type("Pickup").unwrap().slug, "pickup");
        assert_eq!(data.fuel_type("electric"), Some("Electric"));
        assert!(data.transmission("CVT").is_none());
    }

    #[test]
    fn json_round_trip_keeps_table() {
        let data = ReferenceData::builtin();
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"bodyTypes\""));
        assert_eq!(ReferenceData::from_json(&json).unwrap(), data);
    }

    #[test]
    fn duplicate_body_type_slugs_are_rejected() {
        let mut data = ReferenceData::builtin();
        data.body_types.push(data.body_types[0].clone());
        let json = serde_json::to_string(&data).unwrap();
        let err = ReferenceData::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("listed twice"));
    }

    #[tokio::test]
    async fn load_without_path_uses_builtin() {
        assert_eq!(ReferenceData::load(None).await.unwrap(), ReferenceData::builtin());
    }
}
