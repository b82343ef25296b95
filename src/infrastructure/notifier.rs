//! HTTP Notification Gateway
//!
//! Posts each event once to the configured endpoint. No retry and no queueing:
//! a failed post is logged and reported as `false`.

use async_trait::async_trait;
use chrono::FixedOffset;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::NotifierSettings;
use crate::domain::{Notification, Notifier};
use crate::infrastructure::metrics;

/// Why a notification did not arrive.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification endpoint not configured")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// `Notifier` posting JSON to a single HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    url: Option<String>,
    channel: String,
    token: String,
    offset: FixedOffset,
}

impl HttpNotifier {
    /// Build the gateway. An empty URL yields a gateway that never sends.
    pub fn new(settings: &NotifierSettings, offset: FixedOffset) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;

        let url = Some(settings.url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_owned);

        Ok(Self {
            client,
            url,
            channel: settings.channel.clone(),
            token: settings.token.clone(),
            offset,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Request body for `notification`.
    pub fn build_body(&self, notification: &Notification) -> Value {
        let local_time = notification.time.with_timezone(&self.offset);

        let mut message = Map::new();
        message.insert("label".into(), json!(notification.label));
        message.insert(
            "eventTime".into(),
            json!(local_time.format("%Y-%m-%d_%H:%M").to_string()),
        );
        message.insert(
            "timestamp".into(),
            json!(local_time.format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        message.insert("timezone".into(), json!(format!("UTC{}", self.offset)));

        match &notification.payload {
            Some(Value::Object(fields)) => {
                for (key, value) in fields {
                    message.insert(key.clone(), value.clone());
                }
            }
            Some(other) => {
                message.insert("payload".into(), other.clone());
            }
            None => {}
        }

        json!({
            "channel": self.channel,
            "token": self.token,
            "eventName": notification.category,
            "message": Value::Object(message),
        })
    }

    /// Post `notification` once.
    pub async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let url = self.url.as_deref().ok_or(NotifyError::NotConfigured)?;

        let response = self
            .client
            .post(url)
            .json(&self.build_body(notification))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn emit(&self, notification: &Notification) -> bool {
        match self.send(notification).await {
            Ok(()) => {
                debug!(
                    event = %notification.category,
                    label = %notification.label,
                    "Notification delivered"
                );
                metrics::record_notification("delivered");
                true
            }
            Err(NotifyError::NotConfigured) => {
                debug!(event = %notification.category, "Notification endpoint not configured");
                metrics::record_notification("skipped");
                false
            }
            Err(e) => {
                warn!(
                    event = %notification.category,
                    label = %notification.label,
                    error = %e,
                    "Notification failed"
                );
                metrics::record_notification("failed");
                false
            }
        }
    }
}
