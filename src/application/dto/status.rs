//! Status read models.
//!
//! Serialized as-is by the HTTP layer.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::domain::Checkpoint;

/// `HH:MM` in the configured offset.
pub fn format_clock(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%H:%M").to_string()
}

/// `YYYY-MM-DD HH:MM:SS` in the configured offset.
pub fn format_datetime(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// One upcoming checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStartDto {
    pub time: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub seconds_until_start: i64,
}

impl TimeStartDto {
    pub fn new(checkpoint: &Checkpoint, now: DateTime<Utc>) -> Self {
        Self {
            time: checkpoint.time.clone(),
            timestamp: checkpoint.timestamp_millis(),
            seconds_until_start: checkpoint.seconds_until(now),
        }
    }
}

/// Full environment snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentStatus {
    pub connections: u32,
    pub created_at: Option<String>,
    pub expires_at: Option<String>,
    pub current_time: String,
    pub time_starts: Vec<TimeStartDto>,
    pub is_active: bool,
    pub persistence_available: bool,
    pub interval_minutes: u32,
}

/// Reduced snapshot: clock and checkpoints only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStartsView {
    pub current_time: String,
    pub time_starts: Vec<TimeStartDto>,
}

/// Draw service snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStatus {
    pub running: bool,
    pub run_label: Option<String>,
    pub started_at: Option<String>,
    pub tick_seconds: u64,
    pub drawn: Vec<u8>,
    pub remaining: usize,
}
