//! Persistence contract shared by the environment timer and the draw service.
//!
//! Every operation is soft: failures, including "no store configured", come
//! back as `false`/`None` and are logged by the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait Persistence: Send + Sync {
    /// Whether the store is currently usable.
    fn is_available(&self) -> bool;

    /// Re-check the store and re-enable persistence if it answers.
    async fn probe(&self) -> bool;

    /// Insert a row into `conexiones`.
    async fn record_connection(&self, client_id: &str, expires_at: DateTime<Utc>) -> bool;

    /// Insert a row into `time_starts`.
    async fn record_checkpoint(&self, start_time: DateTime<Utc>) -> bool;

    /// Delete every `conexiones` and `time_starts` row.
    async fn purge_environment(&self) -> bool;

    /// Delete `conexiones`/`time_starts` rows that lie in the past.
    async fn prune_expired(&self) -> bool;

    /// Read `parametros.valor` for `name`.
    async fn get_parameter(&self, name: &str) -> Option<String>;

    /// Insert a completed run into `bingos`.
    async fn save_draw_run(&self, label: &str, items: &[u8]) -> bool;
}
