//! Request gate for the product routes.
//!
//! Every request under `/api/products` needs a live store. The gate obtains
//! one from the connection manager (cached after the first success) and
//! attaches it to the request; if no connection can be made the request ends
//! here with a 500 and the route never runs.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use std::sync::Arc;

use crate::services::ProductStore;
use crate::AppState;

/// Live store handle for the current request, set by [`db_gate_middleware`].
#[derive(Clone)]
pub struct Store(pub Arc<dyn ProductStore>);

pub async fn db_gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.connections.connect().await {
        Ok(store) => {
            request.extensions_mut().insert(Store(store));
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(
                path = %request.uri().path(),
                "Rejecting request, database unavailable"
            );
            e.into_response()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Store
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Store>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Database handle missing; route is not behind the database gate"
            ))
        })
    }
}
