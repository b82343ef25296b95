//! Persistence Adapter
//!
//! Implements the domain `Persistence` port on top of the PostgreSQL
//! repositories. Every failure is logged and reported as a negative result;
//! nothing here returns an error to the timers.
//!
//! The first failed operation disables the adapter. While disabled, every
//! operation short-circuits without touching the pool until `probe()` sees the
//! database answer again.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::domain::Persistence;
use crate::infrastructure::metrics;
use crate::infrastructure::repositories::{
    PgDrawRunRepository, PgEnvironmentRepository, PgParameterRepository,
};
use crate::shared::error::AppError;

struct Backend {
    pool: PgPool,
    environment: PgEnvironmentRepository,
    parameters: PgParameterRepository,
    draw_runs: PgDrawRunRepository,
}

/// Best-effort persistence over an optional PostgreSQL pool.
pub struct PersistenceAdapter {
    backend: Option<Backend>,
    available: AtomicBool,
}

impl PersistenceAdapter {
    /// Adapter over `pool`; `None` gives a permanently disabled adapter.
    pub fn new(pool: Option<PgPool>) -> Self {
        let backend = pool.map(|pool| Backend {
            environment: PgEnvironmentRepository::new(pool.clone()),
            parameters: PgParameterRepository::new(pool.clone()),
            draw_runs: PgDrawRunRepository::new(pool.clone()),
            pool,
        });
        let available = AtomicBool::new(backend.is_some());

        Self { backend, available }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// The backend, if persistence is currently enabled.
    fn enabled(&self, operation: &'static str) -> Option<&Backend> {
        let backend = self.backend.as_ref()?;
        if self.available.load(Ordering::Acquire) {
            Some(backend)
        } else {
            debug!(operation, "Persistence disabled, skipping");
            metrics::record_persistence(operation, "skipped");
            None
        }
    }

    /// Await `op`, log a failure and disable persistence on it.
    async fn settle<T, F>(&self, operation: &'static str, op: F) -> Option<T>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match op.await {
            Ok(value) => {
                metrics::record_persistence(operation, "ok");
                Some(value)
            }
            Err(e) => {
                metrics::record_persistence(operation, "error");
                if self.available.swap(false, Ordering::AcqRel) {
                    warn!(operation, error = %e, "Persistence failed, disabling");
                } else {
                    warn!(operation, error = %e, "Persistence failed");
                }
                None
            }
        }
    }
}

#[async_trait]
impl Persistence for PersistenceAdapter {
    fn is_available(&self) -> bool {
        self.backend.is_some() && self.available.load(Ordering::Acquire)
    }

    async fn probe(&self) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };

        match sqlx::query("SELECT 1").execute(&backend.pool).await {
            Ok(_) => {
                if !self.available.swap(true, Ordering::AcqRel) {
                    info!("Database reachable again, persistence re-enabled");
                }
                true
            }
            Err(e) => {
                self.available.store(false, Ordering::Release);
                warn!(error = %e, "Database probe failed");
                false
            }
        }
    }

    async fn record_connection(&self, client_id: &str, expires_at: DateTime<Utc>) -> bool {
        let Some(backend) = self.enabled("record_connection") else {
            return false;
        };
        self.settle(
            "record_connection",
            backend.environment.insert_connection(client_id, expires_at),
        )
        .await
        .is_some()
    }

    async fn record_checkpoint(&self, start_time: DateTime<Utc>) -> bool {
        let Some(backend) = self.enabled("record_checkpoint") else {
            return false;
        };
        self.settle(
            "record_checkpoint",
            backend.environment.insert_checkpoint(start_time),
        )
        .await
        .is_some()
    }

    async fn purge_environment(&self) -> bool {
        let Some(backend) = self.enabled("purge_environment") else {
            return false;
        };
        let purged = self
            .settle("purge_environment", backend.environment.purge())
            .await
            .is_some();
        if purged {
            debug!("Environment records purged");
        }
        purged
    }

    async fn prune_expired(&self) -> bool {
        let Some(backend) = self.enabled("prune_expired") else {
            return false;
        };
        match self
            .settle("prune_expired", backend.environment.prune_expired())
            .await
        {
            Some(removed) => {
                info!(removed, "Expired environment records pruned");
                true
            }
            None => false,
        }
    }

    async fn get_parameter(&self, name: &str) -> Option<String> {
        let backend = self.enabled("get_parameter")?;
        self.settle("get_parameter", backend.parameters.find_value(name))
            .await
            .flatten()
    }

    async fn save_draw_run(&self, label: &str, items: &[u8]) -> bool {
        let Some(backend) = self.enabled("save_draw_run") else {
            return false;
        };
        match self
            .settle("save_draw_run", backend.draw_runs.insert(label, items))
            .await
        {
            Some(id) => {
                info!(id, label, items = items.len(), "Draw run saved");
                true
            }
            None => false,
        }
    }
}
