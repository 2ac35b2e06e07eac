//! Additive tabular price model loaded from a JSON export.
//!
//! ```json
//! {
//!   "label": "Retail",
//!   "intercept": 31000.0,
//!   "numeric": { "age": -1450.0, "mileage": -0.07 },
//!   "categorical": {
//!     "make": { "Toyota": 1800.0, "#na#": 0.0 },
//!     "interior": { "great": 600.0, "rough": -1500.0 }
//!   }
//! }
//! ```
//!
//! price = intercept + Σ coefficient × numeric feature + Σ categorical effect.
//! A category missing from a field's table takes that table's `#na#` entry,
//! or contributes nothing when there is none.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{OracleError, PriceLabel, PriceOracle};
use crate::cleaner::CleanedRow;

/// Category key used for values unseen during training
pub const UNKNOWN_CATEGORY: &str = "#na#";

const NUMERIC_FEATURES: [&str; 2] = ["age", "mileage"];
const CATEGORICAL_FEATURES: [&str; 9] = [
    "make",
    "model",
    "trim",
    "interior",
    "exterior",
    "mechanical",
    "line",
    "drivetrain",
    "transmission",
];

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact has unknown {kind} feature '{name}'")]
    UnknownFeature { kind: &'static str, name: String },

    #[error("model artifact has a non-finite weight for '{0}'")]
    NonFiniteWeight(String),

    #[error("model artifact is labelled '{found}' but configured for {expected}")]
    LabelMismatch { expected: PriceLabel, found: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularModel {
    /// Pricing tier the artifact was trained for
    #[serde(default)]
    pub label: Option<String>,
    pub intercept: f64,
    #[serde(default)]
    pub numeric: HashMap<String, f64>,
    #[serde(default)]
    pub categorical: HashMap<String, HashMap<String, f64>>,
}

impl TabularModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model: TabularModel =
            serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        model.validate()?;
        Ok(model)
    }

    /// Reject features the cleaned row doesn't carry and non-finite weights
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if !self.intercept.is_finite() {
            return Err(ArtifactError::NonFiniteWeight("intercept".to_string()));
        }

        for (name, weight) in &self.numeric {
            if !NUMERIC_FEATURES.contains(&name.as_str()) {
                return Err(ArtifactError::UnknownFeature {
                    kind: "numeric",
                    name: name.clone(),
                });
            }
            if !weight.is_finite() {
                return Err(ArtifactError::NonFiniteWeight(name.clone()));
            }
        }

        for (name, effects) in &self.categorical {
            if !CATEGORICAL_FEATURES.contains(&name.as_str()) {
                return Err(ArtifactError::UnknownFeature {
                    kind: "categorical",
                    name: name.clone(),
                });
            }
            if let Some((category, _)) = effects.iter().find(|(_, w)| !w.is_finite()) {
                return Err(ArtifactError::NonFiniteWeight(format!("{}={}", name, category)));
            }
        }

        Ok(())
    }

    /// An unlabelled artifact is accepted for any tier
    pub fn check_label(&self, expected: PriceLabel) -> Result<(), ArtifactError> {
        match &self.label {
            Some(found) if found.parse::<PriceLabel>().ok() != Some(expected) => {
                Err(ArtifactError::LabelMismatch {
                    expected,
                    found: found.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn evaluate(&self, row: &CleanedRow) -> f64 {
        let numeric: f64 = self
            .numeric
            .iter()
            .filter_map(|(name, coef)| row.numeric(name).map(|x| coef * x))
            .sum();

        let categorical: f64 = self
            .categorical
            .iter()
            .filter_map(|(name, effects)| {
                let value = row.categorical(name)?;
                effects
                    .get(value)
                    .or_else(|| effects.get(UNKNOWN_CATEGORY))
                    .copied()
            })
            .sum();

        self.intercept + numeric + categorical
    }
}

#[async_trait]
impl PriceOracle for TabularModel {
    async fn predict(&self, _label: PriceLabel, row: &CleanedRow) -> Result<f64, OracleError> {
        Ok(self.evaluate(row))
    }

    fn kind(&self) -> &'static str {
        "artifact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row() -> CleanedRow {
        CleanedRow {
            age: 5,
            mileage: 50_000,
            make: "Toyota".into(),
            model: "Sienna".into(),
            trim: "LE".into(),
            interior: "great".into(),
            exterior: "great".into(),
            mechanical: "good".into(),
            line: "Economy".into(),
            drivetrain: "FWD".into(),
            transmission: "Automatic".into(),
        }
    }

    fn model() -> TabularModel {
        serde_json::from_value(serde_json::json!({
            "label": "Retail",
            "intercept": 30000.0,
            "numeric": { "age": -1000.0, "mileage": -0.1 },
            "categorical": {
                "make": { "Toyota": 2000.0, "#na#": -500.0 },
                "mechanical": { "great": 800.0 }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_evaluate_sums_contributions() {
        // 30000 - 5000 - 5000 + 2000 + 0 (mechanical "good" unseen, no #na#)
        assert_eq!(model().evaluate(&row()), 22_000.0);
    }

    #[test]
    fn test_unseen_category_uses_na_entry() {
        let mut r = row();
        r.make = "Honda".into();
        assert_eq!(model().evaluate(&r), 19_500.0);
    }

    #[tokio::test]
    async fn test_predict_matches_evaluate() {
        let m = model();
        let price = m.predict(PriceLabel::Retail, &row()).await.unwrap();
        assert_eq!(price, m.evaluate(&row()));
        assert_eq!(m.kind(), "artifact");
    }

    #[test]
    fn test_label_check() {
        let m = model();
        assert!(m.check_label(PriceLabel::Retail).is_ok());
        assert!(matches!(
            m.check_label(PriceLabel::TradeIn),
            Err(ArtifactError::LabelMismatch { .. })
        ));

        let unlabelled = TabularModel { label: None, ..m };
        assert!(unlabelled.check_label(PriceLabel::TradeIn).is_ok());
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let mut m = model();
        m.numeric.insert("horsepower".into(), 10.0);
        assert!(matches!(
            m.validate(),
            Err(ArtifactError::UnknownFeature { kind: "numeric", .. })
        ));

        let mut m = model();
        m.categorical.insert("color".into(), HashMap::new());
        assert!(matches!(
            m.validate(),
            Err(ArtifactError::UnknownFeature { kind: "categorical", .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&model()).unwrap()).unwrap();

        let loaded = TabularModel::load(file.path()).unwrap();
        assert_eq!(loaded, model());
    }

    #[test]
    fn test_load_errors() {
        let err = TabularModel::load("/nonexistent/retail.json").unwrap_err();
        assert!(matches!(err, ArtifactError::Read { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = TabularModel::load(file.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }
}
