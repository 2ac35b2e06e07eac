use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// Liveness endpoint
///
/// The server only starts listening after the dataset and every oracle have
/// loaded, so answering at all means the service is ready.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "ok": true })))
}
