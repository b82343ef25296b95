//! Environment API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

use crate::common::TestApp;

#[tokio::test(start_paused = true)]
async fn test_idle_status() {
    let app = TestApp::paused();

    let (status, body) = app.get("/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connections"], json!(0));
    assert_eq!(body["createdAt"], json!(null));
    assert_eq!(body["isActive"], json!(false));
    assert_eq!(body["persistenceAvailable"], json!(false));
    assert_eq!(body["intervalMinutes"], json!(30));
    assert_eq!(body["currentTime"], json!("10:05"));
    assert_eq!(body["timeStarts"], json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_first_connect_creates_environment() {
    let app = TestApp::paused();

    let (status, body) = app.connect_as("203.0.113.7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connections"], json!(1));
    assert_eq!(body["isActive"], json!(true));
    assert_eq!(body["createdAt"], json!("2024-05-01 10:05:00"));
    assert_eq!(body["expiresAt"], json!("2024-05-01 11:05:00"));
    assert_eq!(body["timeStarts"][0]["time"], json!("10:30"));
    assert_eq!(body["timeStarts"][0]["secondsUntilStart"], json!(1500));
    assert_eq!(body["timeStarts"][1]["time"], json!("11:00"));
}

#[tokio::test(start_paused = true)]
async fn test_connections_counted_per_distinct_client() {
    let app = TestApp::paused();

    app.connect_as("10.0.0.1").await;
    app.connect_as("10.0.0.1").await;
    let (_, body) = app.connect_as("10.0.0.2, 172.16.0.1").await;

    assert_eq!(body["connections"], json!(2));
    assert!(app.state.timer.session().has_client("10.0.0.2"));
}

#[tokio::test(start_paused = true)]
async fn test_connect_without_client_address_is_rejected() {
    let app = TestApp::paused();

    let (status, body) = app.post("/api/connect").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    assert!(!app.state.timer.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_time_starts_view() {
    let app = TestApp::paused();
    app.connect_as("10.0.0.1").await;
    tokio::time::advance(Duration::from_secs(60)).await;

    let (status, body) = app.get("/api/time-starts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentTime"], json!("10:06"));
    assert_eq!(body["timeStarts"][0]["secondsUntilStart"], json!(1440));
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_clears_environment() {
    let app = TestApp::paused();
    app.connect_as("10.0.0.1").await;
    app.connect_as("10.0.0.2").await;

    let (status, body) = app.post("/api/reset").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connections"], json!(0));
    assert_eq!(body["isActive"], json!(false));

    let (status, _) = app.post("/api/reset").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.connect_as("10.0.0.3").await;
    assert_eq!(body["connections"], json!(1));
}

#[tokio::test(start_paused = true)]
async fn test_interval_update() {
    let app = TestApp::paused();
    app.connect_as("10.0.0.1").await;

    let (status, body) = app.put_json("/api/interval", r#"{"minutes":20}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intervalMinutes"], json!(20));
    assert_eq!(body["timeStarts"][0]["time"], json!("10:20"));
    assert_eq!(body["timeStarts"][1]["time"], json!("10:40"));
}

#[tokio::test(start_paused = true)]
async fn test_interval_out_of_range_rejected() {
    let app = TestApp::paused();

    let (status, _) = app.put_json("/api/interval", r#"{"minutes":0}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put_json("/api/interval", r#"{"minutes":1441}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.state.timer.interval_minutes(), 30);
}

#[tokio::test(start_paused = true)]
async fn test_checkpoint_notification_sent() {
    let app = TestApp::paused();
    app.connect_as("10.0.0.1").await;

    tokio::time::sleep(Duration::from_secs(25 * 60 + 1)).await;

    let events = app.notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].category, "checkpoint");
    assert_eq!(events[0].label, "10:30");
}
