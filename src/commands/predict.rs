use anyhow::{Context, Result};
use car_pricer::{
    cleaner::{RawInput, SystemYear, YearSource},
    config,
    error::AppError,
    handlers::predict::PredictionResponse,
    pricing::PricingService,
};
use std::path::Path;

/// Execute the predict command
///
/// Runs one request body through the same pipeline the server uses and
/// prints the response JSON. Unrecognized vehicles print a failure response
/// like the HTTP endpoint; anything else is a command error.
pub async fn execute(config_path: &Path, input: &Path, year_now: Option<i32>) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let pricer = PricingService::from_config(&cfg, &reqwest::Client::new())
        .context("Failed to load pricing data")?;

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read request '{}'", input.display()))?;
    let raw: RawInput = serde_json::from_str(&content)
        .with_context(|| format!("Invalid request body in '{}'", input.display()))?;

    let year = year_now.unwrap_or_else(|| SystemYear.current_year());
    let response = match pricer.quote(&raw, year).await {
        Ok(quote) => PredictionResponse::from(quote),
        Err(e @ AppError::UnrecognizedVehicle(_)) => PredictionResponse {
            success: false,
            predictions: None,
            matched_vehicle: None,
            message: Some(e.to_string()),
        },
        Err(e) => return Err(e.into()),
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
