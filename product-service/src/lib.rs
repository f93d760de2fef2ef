pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{http_request_span, request_id_middleware},
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::services::{ConnectionManager, Connector};

/// State shared by every handler. The connection cache lives here rather
/// than in a global so tests can inject their own connector.
#[derive(Clone)]
pub struct AppState {
    pub connections: Arc<ConnectionManager>,
}

impl AppState {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connections: Arc::new(ConnectionManager::new(connector)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Resource routes: every request passes the database gate first.
    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::replace_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::db_gate_middleware,
        ));

    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/products", product_routes)
        .fallback(middleware::route_not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(http_request_span::<axum::body::Body>),
        )
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}
