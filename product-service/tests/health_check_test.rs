mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::TestApp;

#[tokio::test]
async fn welcome_reports_connected_status() {
    let app = TestApp::spawn();

    let (status, body) = app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Welcome to my CRUD API! use /api/products to see data."
    );
    assert_eq!(body["mongoStatus"], "Connected ✅");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn welcome_is_stable_across_calls() {
    let app = TestApp::spawn();

    let (_, first) = app.get("/").await;
    let (_, second) = app.get("/").await;

    assert_eq!(first["message"], second["message"]);
    assert_eq!(first["mongoStatus"], second["mongoStatus"]);
    assert_eq!(app.connect_calls(), 1);
}

#[tokio::test]
async fn welcome_reports_connection_failure_as_500() {
    let app = TestApp::failing();

    let (status, body) = app.get("/").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["mongoStatus"], "Disconnected ❌");
    assert!(!body["message"].as_str().unwrap().is_empty());
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn welcome_recovers_once_database_is_reachable() {
    let app = TestApp::failing();
    let (status, _) = app.get("/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    app.set_failing(false);
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mongoStatus"], "Connected ✅");
}

#[tokio::test]
async fn welcome_reports_disconnect_after_server_is_lost() {
    let app = TestApp::spawn();
    let (_, body) = app.get("/").await;
    assert_eq!(body["mongoStatus"], "Connected ✅");

    app.connector.store.set_reachable(false);
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mongoStatus"], "Disconnected ❌");
    let (status, _) = app.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    app.connector.store.set_reachable(true);
    let (_, body) = app.get("/").await;
    assert_eq!(body["mongoStatus"], "Connected ✅");
    assert_eq!(app.connect_calls(), 1);
}

#[tokio::test]
async fn health_check_works_without_database() {
    let app = TestApp::failing();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "product-service");
}

#[tokio::test]
async fn readiness_follows_database_availability() {
    let app = TestApp::failing();
    let (status, _) = app.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    app.set_failing(false);
    let (status, _) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_returns_text() {
    let app = TestApp::spawn();

    let response = tower::util::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let app = TestApp::spawn();

    let (status, body) = app.get("/api/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route not found: /api/unknown");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn();

    let response = tower::util::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .uri("/health")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}
