use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::services::ReadyState;
use crate::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to my CRUD API! use /api/products to see data.";
pub const WELCOME_FAILURE_MESSAGE: &str =
    "Welcome to my CRUD API! The database is currently unreachable.";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeResponse {
    pub message: String,
    pub mongo_status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeErrorResponse {
    pub message: String,
    pub error: String,
    pub mongo_status: String,
}

/// `GET /` - welcome banner plus database status. Connects on a cold
/// instance and pings the server, so a dropped server shows as disconnected;
/// a failure to connect is a 500 body, never an unhandled error.
#[tracing::instrument(skip(state))]
pub async fn welcome(State(state): State<AppState>) -> impl IntoResponse {
    match state.connections.check_status().await {
        Ok(ready_state) => (
            StatusCode::OK,
            Json(WelcomeResponse {
                message: WELCOME_MESSAGE.to_string(),
                mongo_status: ready_state.status_label().to_string(),
                timestamp: Utc::now(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(WelcomeErrorResponse {
                message: WELCOME_FAILURE_MESSAGE.to_string(),
                error: e.to_string(),
                mongo_status: ReadyState::Disconnected.status_label().to_string(),
            }),
        )
            .into_response(),
    }
}

/// Liveness check; does not touch the database.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "product-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check: a connection can be obtained and answers a ping.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.connections.check_status().await {
        Ok(ReadyState::Connected) => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}
