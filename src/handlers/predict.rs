use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    cleaner::{MatchedVehicle, RawInput, YearSource},
    error::AppError,
    gap::PredictionSet,
    metrics,
    pricing::{PricingService, Quote},
};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub pricer: Arc<PricingService>,
    pub clock: Arc<dyn YearSource>,
}

/// Body of every `/predict` response
///
/// Unused fields are omitted rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<PredictionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_vehicle: Option<MatchedVehicle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Quote> for PredictionResponse {
    fn from(quote: Quote) -> Self {
        Self {
            success: true,
            predictions: Some(quote.predictions),
            matched_vehicle: Some(quote.matched_vehicle),
            message: None,
        }
    }
}

/// Handle POST /predict
pub async fn handle_predict(
    State(state): State<AppState>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", request_id = %request_id);

    let result = async {
        let Json(raw) = payload.map_err(|e| AppError::MalformedInput(e.body_text()))?;

        tracing::info!(
            year = raw.year,
            mileage = raw.mileage,
            make = %raw.make,
            model = %raw.model,
            trim = %raw.trim,
            "Handling prediction request"
        );

        let year = state.clock.current_year();
        state.pricer.quote(&raw, year).await
    }
    .instrument(span.clone())
    .await;

    let _guard = span.enter();
    let outcome = match &result {
        Ok(quote) => {
            tracing::info!(
                retail = quote.predictions.retail,
                private = quote.predictions.private,
                trade_in = quote.predictions.trade_in,
                duration_ms = start.elapsed().as_millis() as u64,
                "Prediction completed"
            );
            "success"
        }
        Err(e @ AppError::UnrecognizedVehicle(_)) | Err(e @ AppError::MalformedInput(_)) => {
            tracing::warn!(error = %e, "Prediction rejected");
            e.kind()
        }
        Err(e) => {
            tracing::error!(error = %e, "Prediction failed");
            e.kind()
        }
    };
    metrics::record_request(outcome, start.elapsed());

    result.map(|quote| Json(quote.into()))
}
