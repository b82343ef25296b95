//! Environment Timer
//!
//! Owns the session lifecycle (create, extend, expire) and the checkpoint
//! scheduler. Every timer is a tokio task; state lives behind a
//! `parking_lot::Mutex` that is never held across an `.await`.
//!
//! Each armed timer remembers the generation it was armed under. Recomputing
//! checkpoints or re-arming the expiry bumps the matching generation, so a
//! timer that fires after being superseded does nothing even if its abort
//! raced with the wake-up.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use parking_lot::Mutex;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::dto::{
    format_clock, format_datetime, EnvironmentStatus, TimeStartDto, TimeStartsView,
};
use crate::config::Settings;
use crate::domain::{
    Checkpoint, CheckpointGrid, Notification, Notifier, Persistence, Session,
    CHECKPOINT_CATEGORY, MAX_INTERVAL_MINUTES, MAX_TTL_SECS, UPCOMING_CHECKPOINTS,
};
use crate::infrastructure::metrics;
use crate::shared::clock::SharedClock;
use crate::shared::error::AppError;

/// Construction parameters for [`EnvironmentTimer`].
#[derive(Debug, Clone)]
pub struct EnvironmentTimerConfig {
    /// Session time-to-live
    pub ttl: Duration,

    /// Initial checkpoint grid interval
    pub interval_minutes: u32,

    /// Offset the grid is aligned in and times are rendered in
    pub offset: FixedOffset,

    /// Parameter-table row holding the interval override
    pub interval_parameter: String,
}

impl EnvironmentTimerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            ttl: settings.environment_timer.ttl(),
            interval_minutes: settings.environment_timer.interval_minutes,
            offset: settings.clock.offset().unwrap_or_else(|| Utc.fix()),
            interval_parameter: settings.environment_timer.interval_parameter.clone(),
        }
    }
}

/// The process-wide environment session and its checkpoint scheduler.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct EnvironmentTimer {
    inner: Arc<TimerInner>,
}

struct TimerInner {
    state: Mutex<TimerState>,
    ttl: Duration,
    ttl_span: chrono::Duration,
    interval_parameter: String,
    store: Arc<dyn Persistence>,
    notifier: Arc<dyn Notifier>,
    clock: SharedClock,
}

struct TimerState {
    session: Session,
    grid: CheckpointGrid,
    checkpoints: Vec<Checkpoint>,
    expiry_generation: u64,
    checkpoint_generation: u64,
    expiry_timer: Option<JoinHandle<()>>,
    checkpoint_timers: Vec<JoinHandle<()>>,
}

impl EnvironmentTimer {
    /// Create an idle environment.
    pub fn new(
        config: EnvironmentTimerConfig,
        store: Arc<dyn Persistence>,
        notifier: Arc<dyn Notifier>,
        clock: SharedClock,
    ) -> Result<Self, AppError> {
        let grid = CheckpointGrid::new(config.interval_minutes, config.offset)
            .ok_or_else(|| invalid_interval(config.interval_minutes))?;
        if config.ttl.is_zero() || config.ttl > Duration::from_secs(MAX_TTL_SECS) {
            return Err(invalid_ttl(config.ttl));
        }
        let ttl_span =
            chrono::Duration::from_std(config.ttl).map_err(|_| invalid_ttl(config.ttl))?;

        let state = TimerState {
            session: Session::default(),
            grid,
            checkpoints: Vec::new(),
            expiry_generation: 0,
            checkpoint_generation: 0,
            expiry_timer: None,
            checkpoint_timers: Vec::new(),
        };

        Ok(Self {
            inner: Arc::new(TimerInner {
                state: Mutex::new(state),
                ttl: config.ttl,
                ttl_span,
                interval_parameter: config.interval_parameter,
                store,
                notifier,
                clock,
            }),
        })
    }

    /// Create the session for the first client.
    ///
    /// Returns `false` without touching anything if a session already exists.
    pub async fn initialize(&self, client_id: &str) -> bool {
        let expires_at = {
            let mut state = self.inner.state.lock();
            if state.session.is_active() {
                debug!(client_id, "Environment already initialized");
                return false;
            }

            let now = self.inner.clock.now();
            state.session.register(client_id, now);
            metrics::set_environment_connections(state.session.connection_count);
            self.inner.extend_locked(&mut state, now)
        };

        info!(client_id, expires_at = %expires_at, "First connection, environment initialized");
        self.inner.store.record_connection(client_id, expires_at).await;
        true
    }

    /// Register a client connection and extend the session.
    ///
    /// Repeat clients only extend the expiry. Creates the session when none
    /// exists. Returns whether the client was new.
    pub async fn add_connection(&self, client_id: &str) -> bool {
        let (is_new, connections, expires_at) = {
            let mut state = self.inner.state.lock();
            let now = self.inner.clock.now();
            let is_new = state.session.register(client_id, now);
            let expires_at = self.inner.extend_locked(&mut state, now);
            (is_new, state.session.connection_count, expires_at)
        };

        metrics::set_environment_connections(connections);
        if is_new {
            info!(client_id, connections, "New connection");
            self.inner.store.record_connection(client_id, expires_at).await;
        } else {
            debug!(client_id, expires_at = %expires_at, "Existing connection, extending expiry");
        }
        is_new
    }

    /// Cancel every timer, clear the session and purge persisted records.
    ///
    /// Safe to call on an empty environment.
    pub async fn reset(&self) {
        let was_active = {
            let mut state = self.inner.state.lock();
            let was_active = state.session.is_active();
            self.inner.clear_locked(&mut state);
            was_active
        };

        if was_active {
            metrics::record_environment_reset("manual");
            info!("Environment reset");
        } else {
            debug!("Reset requested on an empty environment");
        }
        self.inner.store.purge_environment().await;
    }

    /// Change the grid interval, recomputing checkpoints of a live session.
    pub fn set_interval(&self, minutes: u32) -> Result<(), AppError> {
        let mut state = self.inner.state.lock();
        state.grid = CheckpointGrid::new(minutes, state.grid.offset())
            .ok_or_else(|| invalid_interval(minutes))?;

        if state.session.is_active() {
            let now = self.inner.clock.now();
            self.inner.rearm_checkpoints_locked(&mut state, now);
        }
        info!(minutes, "Checkpoint interval updated");
        Ok(())
    }

    /// Apply the interval stored in the parameter table, if any.
    ///
    /// Returns the interval in effect afterwards.
    pub async fn load_interval(&self) -> u32 {
        let name = self.inner.interval_parameter.as_str();
        match self.inner.store.get_parameter(name).await {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(minutes) => {
                    if let Err(e) = self.set_interval(minutes) {
                        warn!(parameter = name, value = %raw, error = %e, "Ignoring interval parameter");
                    }
                }
                Err(e) => {
                    warn!(parameter = name, value = %raw, error = %e, "Unparsable interval parameter");
                }
            },
            None => debug!(parameter = name, "No interval parameter, keeping default"),
        }
        self.interval_minutes()
    }

    /// Read-only snapshot of the environment.
    pub fn status(&self) -> EnvironmentStatus {
        let now = self.inner.clock.now();
        let state = self.inner.state.lock();
        let offset = state.grid.offset();

        EnvironmentStatus {
            connections: state.session.connection_count,
            created_at: state.session.created_at.map(|at| format_datetime(at, offset)),
            expires_at: state.session.expires_at.map(|at| format_datetime(at, offset)),
            current_time: format_clock(now, offset),
            time_starts: time_starts(&state.checkpoints, now),
            is_active: state.expiry_timer.is_some(),
            persistence_available: self.inner.store.is_available(),
            interval_minutes: state.grid.interval_minutes(),
        }
    }

    /// Current time and upcoming checkpoints.
    pub fn time_starts(&self) -> TimeStartsView {
        let now = self.inner.clock.now();
        let state = self.inner.state.lock();

        TimeStartsView {
            current_time: format_clock(now, state.grid.offset()),
            time_starts: time_starts(&state.checkpoints, now),
        }
    }

    pub fn session(&self) -> Session {
        self.inner.state.lock().session.clone()
    }

    pub fn checkpoints(&self) -> Vec<Checkpoint> {
        self.inner.state.lock().checkpoints.clone()
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.lock().session.is_active()
    }

    pub fn interval_minutes(&self) -> u32 {
        self.inner.state.lock().grid.interval_minutes()
    }
}

impl TimerInner {
    /// `expires_at = now + ttl`, then re-arm expiry and checkpoints.
    fn extend_locked(self: &Arc<Self>, state: &mut TimerState, now: DateTime<Utc>) -> DateTime<Utc> {
        let expires_at = state.session.extend(now, self.ttl_span);
        self.arm_expiry_locked(state);
        self.rearm_checkpoints_locked(state, now);
        expires_at
    }

    fn arm_expiry_locked(self: &Arc<Self>, state: &mut TimerState) {
        if let Some(timer) = state.expiry_timer.take() {
            timer.abort();
        }
        state.expiry_generation = state.expiry_generation.wrapping_add(1);

        let generation = state.expiry_generation;
        let ttl = self.ttl;
        let weak = Arc::downgrade(self);
        state.expiry_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(generation).await;
            }
        }));
    }

    fn rearm_checkpoints_locked(self: &Arc<Self>, state: &mut TimerState, now: DateTime<Utc>) {
        for timer in state.checkpoint_timers.drain(..) {
            timer.abort();
        }
        state.checkpoint_generation = state.checkpoint_generation.wrapping_add(1);
        state.checkpoints = state.grid.upcoming(now, UPCOMING_CHECKPOINTS);

        let generation = state.checkpoint_generation;
        let timers: Vec<JoinHandle<()>> = state
            .checkpoints
            .iter()
            .filter_map(|checkpoint| {
                let delay = checkpoint.delay_from(now)?;
                let checkpoint = checkpoint.clone();
                let weak = Arc::downgrade(self);
                Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(inner) = weak.upgrade() {
                        inner.fire_checkpoint(generation, checkpoint);
                    }
                }))
            })
            .collect();
        state.checkpoint_timers = timers;

        debug!(
            generation,
            checkpoints = ?state.checkpoints.iter().map(|c| c.time.as_str()).collect::<Vec<_>>(),
            "Checkpoints armed"
        );
    }

    fn fire_checkpoint(self: &Arc<Self>, generation: u64, checkpoint: Checkpoint) {
        {
            let state = self.state.lock();
            if state.checkpoint_generation != generation || !state.session.is_active() {
                debug!(time = %checkpoint.time, "Ignoring stale checkpoint timer");
                return;
            }
        }

        info!(time = %checkpoint.time, "Checkpoint reached");
        metrics::record_checkpoint_fired();

        // Detached so that re-arming never waits on, or cancels, delivery.
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let notification =
                Notification::new(CHECKPOINT_CATEGORY, checkpoint.time.clone(), checkpoint.at)
                    .with_payload(json!({ "time": checkpoint.time }));

            if !inner.notifier.emit(&notification).await {
                warn!(time = %checkpoint.time, "Checkpoint notification not delivered");
            }
            inner.store.record_checkpoint(checkpoint.at).await;
        });
    }

    async fn expire(self: &Arc<Self>, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.expiry_generation != generation {
                debug!("Ignoring stale expiry timer");
                return;
            }
            // This task is the expiry timer; aborting it would cancel the purge below.
            drop(state.expiry_timer.take());
            self.clear_locked(&mut state);
        }

        metrics::record_environment_reset("expired");
        info!("Environment reset after TTL elapsed");
        self.store.purge_environment().await;
    }

    fn clear_locked(&self, state: &mut TimerState) {
        if let Some(timer) = state.expiry_timer.take() {
            timer.abort();
        }
        for timer in state.checkpoint_timers.drain(..) {
            timer.abort();
        }
        state.expiry_generation = state.expiry_generation.wrapping_add(1);
        state.checkpoint_generation = state.checkpoint_generation.wrapping_add(1);
        state.session.clear();
        state.checkpoints.clear();
    }
}

impl Drop for TimerInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(timer) = state.expiry_timer.take() {
            timer.abort();
        }
        for timer in state.checkpoint_timers.drain(..) {
            timer.abort();
        }
    }
}

fn time_starts(checkpoints: &[Checkpoint], now: DateTime<Utc>) -> Vec<TimeStartDto> {
    checkpoints
        .iter()
        .map(|checkpoint| TimeStartDto::new(checkpoint, now))
        .collect()
}

fn invalid_ttl(ttl: Duration) -> AppError {
    AppError::BadRequest(format!(
        "TTL must be within 1..={} seconds, got {:?}",
        MAX_TTL_SECS, ttl
    ))
}

fn invalid_interval(minutes: u32) -> AppError {
    AppError::BadRequest(format!(
        "Interval must be within 1..={} minutes, got {}",
        MAX_INTERVAL_MINUTES, minutes
    ))
}
