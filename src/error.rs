use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    cleaner::CleanError,
    oracle::{ArtifactError, OracleError},
    vocabulary::VocabularyError,
};

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Make or model could not be matched against the vocabulary
    #[error(transparent)]
    UnrecognizedVehicle(#[from] CleanError),

    /// Structurally invalid request
    #[error("Invalid request: {0}")]
    MalformedInput(String),

    /// A price oracle call failed
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Reference data or model artifacts could not be loaded
    #[error("Startup failure: {0}")]
    Startup(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            // The caller sent a well-formed request; it just names no known vehicle.
            Self::UnrecognizedVehicle(_) => StatusCode::OK,
            Self::MalformedInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Oracle(_) => StatusCode::BAD_GATEWAY,
            Self::Startup(_) | Self::ConfigError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnrecognizedVehicle(_) => "unrecognized",
            Self::MalformedInput(_) => "malformed",
            Self::Oracle(_) => "oracle_error",
            Self::Startup(_) => "startup",
            Self::ConfigError(_) => "config_error",
            Self::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<VocabularyError> for AppError {
    fn from(err: VocabularyError) -> Self {
        Self::Startup(err.to_string())
    }
}

impl From<ArtifactError> for AppError {
    fn from(err: ArtifactError) -> Self {
        Self::Startup(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}
