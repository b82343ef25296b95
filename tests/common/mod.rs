//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use checkpoint_server::config::Settings;
use checkpoint_server::domain::{Notification, Notifier};
use checkpoint_server::infrastructure::PersistenceAdapter;
use checkpoint_server::shared::clock::{SharedClock, SystemClock, TokioClock};
use checkpoint_server::startup::AppState;

/// Notifier that records every event and reports success.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn emit(&self, notification: &Notification) -> bool {
        self.events.lock().push(notification.clone());
        true
    }
}

/// 2024-05-01 10:05:00 in Bogota.
pub fn morning() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T10:05:00-05:00")
        .unwrap()
        .with_timezone(&Utc)
}

/// Test application over default settings, no database and a recording notifier
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Application reading the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Application whose clock starts at `morning()` and follows tokio time
    pub fn paused() -> Self {
        Self::with_clock(Arc::new(TokioClock::starting_at(morning())))
    }

    fn with_clock(clock: SharedClock) -> Self {
        let settings = Settings::defaults().expect("default settings");
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(
            settings,
            Arc::new(PersistenceAdapter::disabled()),
            notifier.clone(),
            clock,
        )
        .expect("app state");

        Self {
            router: state.router(),
            state,
            notifier,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// GET returning the raw body text
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// POST without a body
    pub async fn post(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, body)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put_json(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, body)).await
    }

    /// `POST /api/connect` as client `ip`
    pub async fn connect_as(&self, ip: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/connect")
                .header("X-Forwarded-For", ip)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
