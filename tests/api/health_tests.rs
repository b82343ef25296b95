//! Health Check API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check_reports_persistence() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["persistenceAvailable"], json!(false));
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let (status, body) = app.get("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "alive" }));
}

#[tokio::test]
async fn test_readiness_without_database_is_ready() {
    let app = TestApp::new();

    let (status, body) = app.get("/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["checks"]["database"]["status"], json!("disabled"));
    assert_eq!(body["checks"]["notifier"]["status"], json!("disabled"));
}

#[tokio::test]
async fn test_metrics_exposition() {
    let app = TestApp::new();
    app.connect_as("10.1.1.1").await;

    let (status, text) = app.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("checkpoint_server_environment_connections"));
}
