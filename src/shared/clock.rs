//! Wall-clock sources.
//!
//! Timers sleep on tokio's clock while checkpoint arithmetic works on wall-clock
//! instants. `TokioClock` ties the two together so paused-time tests see a wall
//! clock that advances exactly as far as `tokio::time` does.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Source of the current wall-clock instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock anchored at a fixed instant and advanced by `tokio::time`.
#[derive(Debug, Clone)]
pub struct TokioClock {
    anchor_wall: DateTime<Utc>,
    anchor: Instant,
}

impl TokioClock {
    pub fn starting_at(anchor_wall: DateTime<Utc>) -> Self {
        Self {
            anchor_wall,
            anchor: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Instant::now().saturating_duration_since(self.anchor);
        chrono::Duration::from_std(elapsed)
            .map(|elapsed| self.anchor_wall + elapsed)
            .unwrap_or(self.anchor_wall)
    }
}
