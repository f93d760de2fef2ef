//! Terminal failure boundary of the request pipeline.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use service_core::error::{AppError, ErrorResponse};
use std::any::Any;

/// Turn a panic anywhere below the catch-panic layer into a JSON 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Unhandled panic while serving request");
    counter!("http_panics_total").increment(1);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error")),
    )
        .into_response()
}

pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Route not found: {}", uri.path()))
}
