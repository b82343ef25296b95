//! Checkpoint ("time start") entity.

use chrono::{DateTime, FixedOffset, Utc};

/// A scheduled wall-clock instant at which a notification fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// `HH:MM` in the configured offset
    pub time: String,

    /// Absolute instant
    pub at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(at: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            time: at.with_timezone(&offset).format("%H:%M").to_string(),
            at,
        }
    }

    /// Whole seconds until the checkpoint, rounded, never negative.
    pub fn seconds_until(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.at - now).num_milliseconds();
        ((millis + 500).div_euclid(1000)).max(0)
    }

    /// Time left until the checkpoint, `None` once it has passed.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        (self.at - now).to_std().ok().filter(|delay| !delay.is_zero())
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> i64 {
        self.at.timestamp_millis()
    }
}
