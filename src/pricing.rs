//! Request pipeline: validate → normalize → three price lookups → gap enforcement.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    cleaner::{MatchedVehicle, RawInput, RowCleaner},
    config::Config,
    error::AppError,
    gap::PredictionSet,
    metrics,
    oracle::{OracleSet, PriceLabel},
    vocabulary::VocabularyIndex,
};

/// Successful pricing result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub predictions: PredictionSet,
    pub matched_vehicle: MatchedVehicle,
}

/// Shared, read-only pricing engine
pub struct PricingService {
    cleaner: RowCleaner,
    oracles: OracleSet,
    gap: f64,
    enforce_gap: bool,
}

impl PricingService {
    pub fn new(cleaner: RowCleaner, oracles: OracleSet, gap: f64, enforce_gap: bool) -> Self {
        Self {
            cleaner,
            oracles,
            gap,
            enforce_gap,
        }
    }

    /// Load the reference dataset and every oracle named in the configuration.
    ///
    /// Any failure here is fatal; the service never runs partially loaded.
    pub fn from_config(config: &Config, http_client: &reqwest::Client) -> Result<Self, AppError> {
        let index = VocabularyIndex::load_csv(&config.dataset.path)?;
        let oracles = OracleSet::from_config(
            &config.oracles.retail,
            &config.oracles.private,
            &config.oracles.trade_in,
            http_client,
        )?;

        Ok(Self::new(
            RowCleaner::new(Arc::new(index)),
            oracles,
            config.pricing.gap,
            config.pricing.enforce_gap,
        ))
    }

    pub fn vocabulary(&self) -> &VocabularyIndex {
        self.cleaner.index()
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    pub async fn quote(&self, raw: &RawInput, current_year: i32) -> Result<Quote, AppError> {
        raw.validate().map_err(AppError::MalformedInput)?;

        let outcome = self.cleaner.clean(raw, current_year)?;
        for field in &outcome.fallbacks {
            metrics::record_fallback(field);
        }

        tracing::info!(
            make = %outcome.matched.make,
            model = %outcome.matched.model,
            trim = %outcome.matched.trim,
            age = outcome.row.age,
            fallbacks = ?outcome.fallbacks,
            "Vehicle matched"
        );

        let predicted = self.oracles.predict_all(&outcome.row).await?;
        let predictions = if self.enforce_gap {
            let adjusted = predicted.enforce_gaps(self.gap);
            record_adjustments(&predicted, &adjusted);
            adjusted
        } else {
            predicted
        };

        Ok(Quote {
            predictions,
            matched_vehicle: outcome.matched,
        })
    }
}

fn record_adjustments(before: &PredictionSet, after: &PredictionSet) {
    if after.private != before.private {
        tracing::debug!(from = before.private, to = after.private, "Private price raised to keep gap");
        metrics::record_gap_adjustment(PriceLabel::Private.as_str());
    }
    if after.retail != before.retail {
        tracing::debug!(from = before.retail, to = after.retail, "Retail price raised to keep gap");
        metrics::record_gap_adjustment(PriceLabel::Retail.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::CleanedRow;
    use crate::oracle::{OracleError, PriceOracle};
    use crate::vocabulary::VehicleRecord;
    use async_trait::async_trait;

    /// Same price for every tier, so gap enforcement always kicks in
    struct FlatOracle(f64);

    #[async_trait]
    impl PriceOracle for FlatOracle {
        async fn predict(&self, _label: PriceLabel, _row: &CleanedRow) -> Result<f64, OracleError> {
            Ok(self.0)
        }

        fn kind(&self) -> &'static str {
            "flat"
        }
    }

    fn service(enforce_gap: bool) -> PricingService {
        let index = VocabularyIndex::from_records(vec![
            VehicleRecord::new("Toyota", "Sienna", "LE"),
            VehicleRecord::new("Toyota", "Camry", "SE"),
        ]);
        let oracle: Arc<dyn PriceOracle> = Arc::new(FlatOracle(1000.0));
        PricingService::new(
            RowCleaner::new(Arc::new(index)),
            OracleSet::new(oracle.clone(), oracle.clone(), oracle),
            500.0,
            enforce_gap,
        )
    }

    fn raw() -> RawInput {
        RawInput {
            year: 2020,
            mileage: 55_000,
            make: "Toyota".into(),
            model: "Sienna".into(),
            trim: "LE".into(),
            interior: "great".into(),
            exterior: "great".into(),
            mechanical: "great".into(),
            line: "Economy".into(),
            drivetrain: "FWD".into(),
            transmission: "5-speed automatic".into(),
        }
    }

    #[tokio::test]
    async fn test_quote_enforces_gap() {
        let quote = service(true).quote(&raw(), 2025).await.unwrap();
        assert_eq!(quote.predictions, PredictionSet::new(2000.0, 1500.0, 1000.0));
        assert_eq!(quote.matched_vehicle.model, "Sienna");
    }

    #[tokio::test]
    async fn test_quote_without_gap_returns_raw_prices() {
        let quote = service(false).quote(&raw(), 2025).await.unwrap();
        assert_eq!(quote.predictions, PredictionSet::new(1000.0, 1000.0, 1000.0));
    }

    #[tokio::test]
    async fn test_quote_rejects_invalid_mileage() {
        let mut input = raw();
        input.mileage = -5;
        let err = service(true).quote(&input, 2025).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_quote_unknown_make() {
        let mut input = raw();
        input.make = "Zzzqqq".into();
        let err = service(true).quote(&input, 2025).await.unwrap_err();
        assert!(matches!(err, AppError::UnrecognizedVehicle(_)));
    }
}
