//! Draw API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

use crate::common::TestApp;

#[tokio::test(start_paused = true)]
async fn test_idle_draw_status() {
    let app = TestApp::paused();

    let (status, body) = app.get("/api/draw/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], json!(false));
    assert_eq!(body["runLabel"], json!(null));
    assert_eq!(body["tickSeconds"], json!(20));
    assert_eq!(body["drawn"], json!([]));
    assert_eq!(body["remaining"], json!(75));
}

#[tokio::test(start_paused = true)]
async fn test_start_without_body_uses_current_time() {
    let app = TestApp::paused();

    let (status, body) = app.post("/api/draw/start").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], json!(true));
    assert_eq!(body["runLabel"], json!("Bingo_2024-05-01_10:05"));
}

#[tokio::test(start_paused = true)]
async fn test_start_with_explicit_start_time() {
    let app = TestApp::paused();

    let (status, body) = app
        .post_json("/api/draw/start", r#"{"startTime":"2024-05-01T20:15:00Z"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["runLabel"], json!("Bingo_2024-05-01_15:15"));
    assert_eq!(body["startedAt"], json!("2024-05-01 15:15:00"));
}

#[tokio::test(start_paused = true)]
async fn test_second_start_conflicts() {
    let app = TestApp::paused();
    app.post("/api/draw/start").await;

    let (status, body) = app.post("/api/draw/start").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!(10005));
}

#[tokio::test(start_paused = true)]
async fn test_draws_tick_and_stop() {
    let app = TestApp::paused();
    app.put_json("/api/draw/interval", r#"{"seconds":5}"#).await;
    app.post("/api/draw/start").await;

    tokio::time::sleep(Duration::from_secs(16)).await;

    let (_, body) = app.get("/api/draw/status").await;
    assert_eq!(body["drawn"].as_array().unwrap().len(), 3);
    assert_eq!(body["remaining"], json!(72));

    let (status, body) = app.post("/api/draw/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], json!(false));
    assert_eq!(body["drawn"].as_array().unwrap().len(), 3);

    let events = app.notifier.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].category, "Bingo_2024-05-01_10:05");
    assert_eq!(events[2].payload.as_ref().unwrap()["sequence"], json!(3));
}

#[tokio::test(start_paused = true)]
async fn test_stop_when_idle_conflicts() {
    let app = TestApp::paused();

    let (status, _) = app.post("/api/draw/stop").await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(start_paused = true)]
async fn test_zero_tick_rejected() {
    let app = TestApp::paused();

    let (status, _) = app.put_json("/api/draw/interval", r#"{"seconds":0}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.state.draws.tick_seconds(), 20);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_tick_rejected_and_draw_still_starts() {
    let app = TestApp::paused();

    let (status, _) = app
        .put_json("/api/draw/interval", r#"{"seconds":18446744073709551615}"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.state.draws.tick_seconds(), 20);

    let (status, _) = app.post("/api/draw/start").await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.state.draws.is_running());
    assert!(app.state.draws.stop().await);
}
