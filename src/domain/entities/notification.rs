//! Outbound notification and the gateway contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Event category used for checkpoint firings.
pub const CHECKPOINT_CATEGORY: &str = "checkpoint";

/// "Event X happened at time T", with optional event-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Event category; sent as the event name
    pub category: String,

    /// Human label of the event
    pub label: String,

    /// When the event happened
    pub time: DateTime<Utc>,

    /// Event-specific fields
    pub payload: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(category: impl Into<String>, label: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            category: category.into(),
            label: label.into(),
            time,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Notification gateway.
///
/// Sends once and reports whether the endpoint accepted the event. Failures are
/// logged by the implementation; callers treat `false` as "did not arrive".
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn emit(&self, notification: &Notification) -> bool;
}
