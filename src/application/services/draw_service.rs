//! Draw Service
//!
//! Runs one draw at a time: a shuffled pool of `POOL_SIZE` items dispensed one
//! per tick. Every item is announced through the notifier; the full sequence is
//! persisted when the run ends, whether it exhausted the pool or was stopped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use parking_lot::Mutex;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::application::dto::{format_datetime, DrawStatus};
use crate::config::Settings;
use crate::domain::{
    join_sequence, run_label, DrawRun, Notification, Notifier, Persistence, MAX_TICK_SECONDS,
};
use crate::infrastructure::metrics;
use crate::shared::clock::SharedClock;
use crate::shared::error::AppError;

#[derive(Debug, Clone)]
pub struct DrawServiceConfig {
    /// Time between draws
    pub tick: Duration,

    /// Run label prefix, also the label of every draw notification
    pub label_prefix: String,

    /// Offset run labels are rendered in
    pub offset: FixedOffset,

    /// Parameter-table row holding the tick override (seconds)
    pub tick_parameter: String,
}

impl DrawServiceConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tick: settings.draw.tick(),
            label_prefix: settings.draw.label_prefix.clone(),
            offset: settings.clock.offset().unwrap_or_else(|| Utc.fix()),
            tick_parameter: settings.draw.tick_parameter.clone(),
        }
    }
}

/// Interval-driven draw dispenser. Cheap to clone.
#[derive(Clone)]
pub struct DrawService {
    inner: Arc<DrawInner>,
}

struct DrawInner {
    state: Mutex<DrawState>,
    label_prefix: String,
    offset: FixedOffset,
    tick_parameter: String,
    store: Arc<dyn Persistence>,
    notifier: Arc<dyn Notifier>,
    clock: SharedClock,
}

struct DrawState {
    run: DrawRun,
    running: bool,
    run_label: Option<String>,
    started_at: Option<DateTime<Utc>>,
    tick: Duration,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl DrawService {
    pub fn new(
        config: DrawServiceConfig,
        store: Arc<dyn Persistence>,
        notifier: Arc<dyn Notifier>,
        clock: SharedClock,
    ) -> Result<Self, AppError> {
        if config.tick.is_zero() || config.tick > Duration::from_secs(MAX_TICK_SECONDS) {
            return Err(invalid_tick(config.tick.as_secs()));
        }

        let state = DrawState {
            run: DrawRun::default(),
            running: false,
            run_label: None,
            started_at: None,
            tick: config.tick,
            generation: 0,
            timer: None,
        };

        Ok(Self {
            inner: Arc::new(DrawInner {
                state: Mutex::new(state),
                label_prefix: config.label_prefix,
                offset: config.offset,
                tick_parameter: config.tick_parameter,
                store,
                notifier,
                clock,
            }),
        })
    }

    /// Start a run labelled after `start_time` (default: now).
    ///
    /// Returns `false` if a run is already in progress.
    pub fn start(&self, start_time: Option<DateTime<Utc>>) -> bool {
        let mut state = self.inner.state.lock();
        if state.running {
            info!(run_label = ?state.run_label, "Draw already running");
            return false;
        }

        let started_at = start_time.unwrap_or_else(|| self.inner.clock.now());
        let label = run_label(&self.inner.label_prefix, started_at, self.inner.offset);

        state.run = DrawRun::shuffled(&mut rand::rng());
        state.running = true;
        state.run_label = Some(label.clone());
        state.started_at = Some(started_at);
        state.generation = state.generation.wrapping_add(1);

        let generation = state.generation;
        let tick = state.tick;
        let weak = Arc::downgrade(&self.inner);
        state.timer = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                if !inner.tick(generation).await {
                    break;
                }
            }
        }));

        info!(run_label = %label, tick_seconds = tick.as_secs(), "Draw started");
        true
    }

    /// Stop the current run and persist what was drawn.
    ///
    /// Returns `false` if no run was in progress.
    pub async fn stop(&self) -> bool {
        let stopped = self.inner.finish(None).await;
        if !stopped {
            debug!("Stop requested with no draw running");
        }
        stopped
    }

    /// Set the tick used by the next run.
    pub fn set_tick_interval(&self, seconds: u64) -> Result<(), AppError> {
        if seconds == 0 || seconds > MAX_TICK_SECONDS {
            return Err(invalid_tick(seconds));
        }
        self.inner.state.lock().tick = Duration::from_secs(seconds);
        info!(seconds, "Draw interval updated");
        Ok(())
    }

    /// Apply the tick stored in the parameter table, if any.
    ///
    /// Returns the tick in seconds in effect afterwards.
    pub async fn load_tick_interval(&self) -> u64 {
        let name = self.inner.tick_parameter.as_str();
        if let Some(raw) = self.inner.store.get_parameter(name).await {
            match raw.trim().parse::<u64>() {
                Ok(seconds) => {
                    if let Err(e) = self.set_tick_interval(seconds) {
                        warn!(parameter = name, value = %raw, error = %e, "Ignoring draw interval parameter");
                    }
                }
                Err(e) => {
                    warn!(parameter = name, value = %raw, error = %e, "Unparsable draw interval parameter");
                }
            }
        }
        self.tick_seconds()
    }

    pub fn status(&self) -> DrawStatus {
        let state = self.inner.state.lock();
        DrawStatus {
            running: state.running,
            run_label: state.run_label.clone(),
            started_at: state
                .started_at
                .map(|at| format_datetime(at, self.inner.offset)),
            tick_seconds: state.tick.as_secs(),
            drawn: state.run.drawn().to_vec(),
            remaining: state.run.remaining(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().running
    }

    pub fn tick_seconds(&self) -> u64 {
        self.inner.state.lock().tick.as_secs()
    }
}

impl DrawInner {
    /// Draw one item. Returns whether the ticker should keep going.
    async fn tick(self: &Arc<Self>, generation: u64) -> bool {
        let (label, item, position, exhausted) = {
            let mut state = self.state.lock();
            if !state.running || state.generation != generation {
                return false;
            }
            let Some(item) = state.run.draw() else {
                return false;
            };
            let label = state.run_label.clone().unwrap_or_default();
            (label, item, state.run.drawn().len(), state.run.is_exhausted())
        };

        metrics::record_draw_tick();
        debug!(run_label = %label, item, position, "Item drawn");

        let now = self.clock.now();
        let notification = Notification::new(label, self.label_prefix.clone(), now).with_payload(
            json!({
                "number": item,
                "sequence": position,
                "drawnAt": format_datetime(now, self.offset),
            }),
        );
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if !notifier.emit(&notification).await {
                warn!(item, position, "Draw notification not delivered");
            }
        });

        if exhausted {
            self.finish(Some(generation)).await;
            return false;
        }
        true
    }

    /// End the run and persist its sequence.
    ///
    /// `from_ticker` carries the generation of the calling ticker, which must
    /// not abort itself.
    async fn finish(&self, from_ticker: Option<u64>) -> bool {
        let (label, drawn) = {
            let mut state = self.state.lock();
            if !state.running {
                return false;
            }
            if from_ticker.is_some_and(|generation| generation != state.generation) {
                return false;
            }

            if let Some(timer) = state.timer.take() {
                if from_ticker.is_none() {
                    timer.abort();
                }
            }
            state.running = false;
            state.generation = state.generation.wrapping_add(1);
            state.started_at = None;
            let label = state.run_label.take().unwrap_or_default();
            (label, state.run.drawn().to_vec())
        };

        info!(
            run_label = %label,
            total = drawn.len(),
            sequence = %join_sequence(&drawn),
            "Draw finished"
        );
        if !self.store.save_draw_run(&label, &drawn).await {
            warn!(run_label = %label, "Draw run not persisted");
        }
        true
    }
}

impl Drop for DrawInner {
    fn drop(&mut self) {
        if let Some(timer) = self.state.get_mut().timer.take() {
            timer.abort();
        }
    }
}

fn invalid_tick(seconds: u64) -> AppError {
    AppError::BadRequest(format!(
        "Draw interval must be within 1..={} seconds, got {}",
        MAX_TICK_SECONDS, seconds
    ))
}
