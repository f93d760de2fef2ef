#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use product_service::services::{Connector, InMemoryProductStore, ProductStore};
use product_service::{build_router, AppState};
use serde_json::Value;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Connector backed by an in-memory store that counts attempts and can be
/// switched into a failing mode.
#[derive(Default)]
pub struct FlakyConnector {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub store: Arc<InMemoryProductStore>,
}

#[async_trait]
impl Connector for FlakyConnector {
    async fn connect(&self) -> Result<Arc<dyn ProductStore>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::ConnectionError(anyhow::anyhow!(
                "Server selection timeout: No available servers"
            )));
        }
        Ok(self.store.clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub connector: Arc<FlakyConnector>,
    pub state: AppState,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_connector(Arc::new(FlakyConnector::default()))
    }

    /// App whose database is unreachable until `set_failing(false)`.
    pub fn failing() -> Self {
        let connector = Arc::new(FlakyConnector::default());
        connector.fail.store(true, Ordering::SeqCst);
        Self::with_connector(connector)
    }

    fn with_connector(connector: Arc<FlakyConnector>) -> Self {
        let state = AppState::new(connector.clone());
        let router = build_router(state.clone());
        Self {
            router,
            connector,
            state,
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.connector.fail.store(fail, Ordering::SeqCst);
    }

    pub fn connect_calls(&self) -> usize {
        self.connector.calls.load(Ordering::SeqCst)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        (status, json)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

pub fn pen() -> Value {
    serde_json::json!({
        "name": "Pen",
        "description": "Blue ink",
        "price": 1.5,
        "category": "Stationery"
    })
}
