//! Turns a raw pricing request into a model-ready feature row.
//!
//! Order matters: the model is matched only against the resolved make's
//! models, and the trim only against the resolved (make, model) trims. A bad
//! make match therefore cascades into the later candidate sets.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    buckets::{self, FieldRule},
    fuzzy,
    vocabulary::VocabularyIndex,
};

/// Earliest model year accepted at the boundary
pub const MIN_YEAR: i64 = 1900;

/// Longest text field accepted, in characters; scoring is quadratic in length
pub const MAX_FIELD_CHARS: usize = 256;

/// Vehicle description as submitted by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    pub year: i64,
    pub mileage: i64,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub interior: String,
    pub exterior: String,
    pub mechanical: String,
    pub line: String,
    pub drivetrain: String,
    pub transmission: String,
}

impl RawInput {
    /// Range checks the JSON schema alone can't express
    pub fn validate(&self) -> Result<(), String> {
        if self.year < MIN_YEAR {
            return Err(format!(
                "year must be greater than or equal to {}, got {}",
                MIN_YEAR, self.year
            ));
        }
        if self.mileage < 0 {
            return Err(format!(
                "mileage must be greater than or equal to 0, got {}",
                self.mileage
            ));
        }
        for (field, value) in self.text_fields() {
            if value.chars().count() > MAX_FIELD_CHARS {
                return Err(format!(
                    "{} must be at most {} characters",
                    field, MAX_FIELD_CHARS
                ));
            }
        }
        Ok(())
    }

    fn text_fields(&self) -> [(&'static str, &str); 9] {
        [
            ("make", self.make.as_str()),
            ("model", self.model.as_str()),
            ("trim", self.trim.as_str()),
            ("interior", self.interior.as_str()),
            ("exterior", self.exterior.as_str()),
            ("mechanical", self.mechanical.as_str()),
            ("line", self.line.as_str()),
            ("drivetrain", self.drivetrain.as_str()),
            ("transmission", self.transmission.as_str()),
        ]
    }
}

/// Feature row handed to the price models
///
/// Every categorical field holds a vocabulary member or a documented default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedRow {
    /// Current year minus model year. Not clamped; a future model year gives
    /// a negative age.
    pub age: i64,
    pub mileage: i64,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub interior: String,
    pub exterior: String,
    pub mechanical: String,
    pub line: String,
    pub drivetrain: String,
    pub transmission: String,
}

impl CleanedRow {
    /// Categorical value by feature name
    pub fn categorical(&self, field: &str) -> Option<&str> {
        let value = match field {
            "make" => &self.make,
            "model" => &self.model,
            "trim" => &self.trim,
            "interior" => &self.interior,
            "exterior" => &self.exterior,
            "mechanical" => &self.mechanical,
            "line" => &self.line,
            "drivetrain" => &self.drivetrain,
            "transmission" => &self.transmission,
            _ => return None,
        };
        Some(value)
    }

    /// Numeric value by feature name
    pub fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "age" => Some(self.age as f64),
            "mileage" => Some(self.mileage as f64),
            _ => None,
        }
    }
}

/// Canonical identity echoed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedVehicle {
    pub make: String,
    pub model: String,
    pub trim: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanError {
    #[error("Unknown make '{raw}'")]
    UnknownMake { raw: String },

    #[error("Unknown model '{raw}' for make '{make}'")]
    UnknownModel { raw: String, make: String },
}

/// Result of cleaning one request
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub row: CleanedRow,
    pub matched: MatchedVehicle,
    /// Fields where the configured default was substituted
    pub fallbacks: Vec<&'static str>,
}

/// Source of the current calendar year used to derive vehicle age
pub trait YearSource: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Reads the local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemYear;

impl YearSource for SystemYear {
    fn current_year(&self) -> i32 {
        chrono::Local::now().year()
    }
}

/// Always reports the same year
#[derive(Debug, Clone, Copy)]
pub struct FixedYear(pub i32);

impl YearSource for FixedYear {
    fn current_year(&self) -> i32 {
        self.0
    }
}

/// Normalizes request fields against the vocabulary index and fixed buckets
#[derive(Debug, Clone)]
pub struct RowCleaner {
    index: Arc<VocabularyIndex>,
}

impl RowCleaner {
    pub fn new(index: Arc<VocabularyIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &VocabularyIndex {
        &self.index
    }

    pub fn clean(&self, raw: &RawInput, current_year: i32) -> Result<CleanOutcome, CleanError> {
        let age = i64::from(current_year) - raw.year;
        let mut fallbacks = Vec::new();

        let make = resolve(buckets::MAKE, &raw.make, self.index.makes(), &mut fallbacks)
            .ok_or_else(|| CleanError::UnknownMake {
                raw: raw.make.clone(),
            })?;

        let model = resolve(
            buckets::MODEL,
            &raw.model,
            self.index.models_for(&make),
            &mut fallbacks,
        )
        .ok_or_else(|| CleanError::UnknownModel {
            raw: raw.model.clone(),
            make: make.clone(),
        })?;

        let trims = self.index.trims_for(&make, &model);
        let mut categorical = |rule: FieldRule, value: &str, vocabulary: &[&str]| {
            resolve(rule, value, vocabulary, &mut fallbacks).unwrap_or_default()
        };
        let trim_vocabulary: Vec<&str> = trims.iter().map(String::as_str).collect();
        let trim = categorical(buckets::TRIM, &raw.trim, &trim_vocabulary);
        let interior = categorical(buckets::INTERIOR, &raw.interior, buckets::CONDITION_BUCKETS);
        let exterior = categorical(buckets::EXTERIOR, &raw.exterior, buckets::CONDITION_BUCKETS);
        let mechanical =
            categorical(buckets::MECHANICAL, &raw.mechanical, buckets::CONDITION_BUCKETS);
        let line = categorical(buckets::LINE, &raw.line, buckets::LINE_BUCKETS);
        let drivetrain = categorical(buckets::DRIVETRAIN, &raw.drivetrain, buckets::DRIVETRAIN_BUCKETS);
        let transmission = categorical(
            buckets::TRANSMISSION,
            &raw.transmission,
            buckets::TRANSMISSION_BUCKETS,
        );

        let matched = MatchedVehicle {
            make: make.clone(),
            model: model.clone(),
            trim: trim.clone(),
        };

        Ok(CleanOutcome {
            row: CleanedRow {
                age,
                mileage: raw.mileage,
                make,
                model,
                trim,
                interior,
                exterior,
                mechanical,
                line,
                drivetrain,
                transmission,
            },
            matched,
            fallbacks,
        })
    }
}

/// Apply one field rule; records the field when its default was used
fn resolve<S: AsRef<str>>(
    rule: FieldRule,
    value: &str,
    vocabulary: &[S],
    fallbacks: &mut Vec<&'static str>,
) -> Option<String> {
    if let Some(canonical) = fuzzy::normalize(value, vocabulary, rule.threshold) {
        tracing::debug!(field = rule.field, raw = %value, canonical = %canonical, "Field matched");
        return Some(canonical.to_string());
    }

    let default = rule.default?;
    tracing::debug!(field = rule.field, raw = %value, default = %default, "Field fell back to default");
    fallbacks.push(rule.field);
    Some(default.to_string())
}
