//! In-memory collaborators for service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use parking_lot::Mutex;

use crate::domain::{Notification, Notifier, Persistence};
use crate::shared::clock::TokioClock;

pub fn bogota() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

/// Bogota wall-clock time on 2024-05-01.
pub fn local(hh_mm_ss: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&format!("2024-05-01T{}-05:00", hh_mm_ss))
        .unwrap()
        .with_timezone(&Utc)
}

/// A paused-time clock reading `hh_mm_ss` Bogota time right now.
pub fn clock_at(hh_mm_ss: &str) -> Arc<TokioClock> {
    Arc::new(TokioClock::starting_at(local(hh_mm_ss)))
}

#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
    reject: AtomicBool,
}

impl RecordingNotifier {
    pub fn rejecting() -> Self {
        let notifier = Self::default();
        notifier.reject.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn emit(&self, notification: &Notification) -> bool {
        self.events.lock().push(notification.clone());
        !self.reject.load(Ordering::SeqCst)
    }
}

pub struct MemoryStore {
    available: AtomicBool,
    pub connections: Mutex<Vec<(String, DateTime<Utc>)>>,
    pub checkpoints: Mutex<Vec<DateTime<Utc>>>,
    pub parameters: Mutex<HashMap<String, String>>,
    pub runs: Mutex<Vec<(String, Vec<u8>)>>,
    pub purges: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            connections: Mutex::default(),
            checkpoints: Mutex::default(),
            parameters: Mutex::default(),
            runs: Mutex::default(),
            purges: AtomicUsize::new(0),
        }
    }

    pub fn with_parameter(self, name: &str, value: &str) -> Self {
        self.parameters.lock().insert(name.into(), value.into());
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn purge_count(&self) -> usize {
        self.purges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn probe(&self) -> bool {
        self.is_available()
    }

    async fn record_connection(&self, client_id: &str, expires_at: DateTime<Utc>) -> bool {
        // Suspend like real I/O so concurrent callers interleave.
        tokio::task::yield_now().await;
        self.connections.lock().push((client_id.into(), expires_at));
        true
    }

    async fn record_checkpoint(&self, start_time: DateTime<Utc>) -> bool {
        self.checkpoints.lock().push(start_time);
        true
    }

    async fn purge_environment(&self) -> bool {
        tokio::task::yield_now().await;
        self.purges.fetch_add(1, Ordering::SeqCst);
        self.connections.lock().clear();
        self.checkpoints.lock().clear();
        true
    }

    async fn prune_expired(&self) -> bool {
        true
    }

    async fn get_parameter(&self, name: &str) -> Option<String> {
        self.parameters.lock().get(name).cloned()
    }

    async fn save_draw_run(&self, label: &str, items: &[u8]) -> bool {
        self.runs.lock().push((label.into(), items.to_vec()));
        true
    }
}
