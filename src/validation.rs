use std::{borrow::Cow, fmt};

use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationError;

use crate::services::current_year;

/// First model year accepted for a listing.
pub const EARLIEST_MODEL_YEAR: i32 = 1886;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every problem found in one input, keyed by wire field name.
///
/// Validation keeps going after the first failure so the caller sees all
/// invalid fields at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Starts from the outcome of a `#[derive(Validate)]` check so further
    /// rules can be added on top.
    pub fn from_rules(result: Result<(), validator::ValidationErrors>) -> Self {
        result.err().map(Self::from).unwrap_or_default()
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = source.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let mut errors = Self::new();
        for (field, failures) in fields {
            let field = wire_name(&field);
            for failure in failures {
                let message = match &failure.message {
                    Some(message) => message.to_string(),
                    None => format!("is invalid ({})", failure.code),
                };
                errors.add(&field, message);
            }
        }
        errors
    }
}

/// `fuel_type` -> `fuelType`.
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            name.extend(ch.to_uppercase());
            upper = false;
        } else {
            name.push(ch);
        }
    }
    name
}

fn rule_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("blank", "must not be blank"));
    }
    Ok(())
}

/// Model years run from [`EARLIEST_MODEL_YEAR`] to next year.
pub fn model_year(year: i32) -> Result<(), ValidationError> {
    let latest = current_year() + 1;
    if !(EARLIEST_MODEL_YEAR..=latest).contains(&year) {
        return Err(rule_error(
            "model_year",
            format!("must be between {EARLIEST_MODEL_YEAR} and {latest}"),
        ));
    }
    Ok(())
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation failed")?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
