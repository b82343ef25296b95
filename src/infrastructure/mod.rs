//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database pool and repositories (PostgreSQL)
//! - The persistence adapter behind the domain `Persistence` port
//! - The HTTP notification gateway
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod notifier;
pub mod persistence;
pub mod repositories;

pub use notifier::{HttpNotifier, NotifyError};
pub use persistence::PersistenceAdapter;
