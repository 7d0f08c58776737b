pub mod extract;
pub mod products;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::error;

use crate::{error::AppError, AppState};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Product Management API is running" }))
}

/// Liveness: answers as long as the process does.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "version": API_VERSION,
            "timestamp": timestamp(),
        })),
    )
}

/// Readiness: also requires a round-trip to the database.
pub async fn detailed_health(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if let Err(err) = state.store.ping().await {
        error!(error = %err, "Detailed health check failed");
        return Err(AppError::Unavailable(err.to_string()));
    }

    Ok(Json(json!({
        "status": "healthy",
        "database": "connected",
        "version": API_VERSION,
        "timestamp": timestamp(),
    })))
}
