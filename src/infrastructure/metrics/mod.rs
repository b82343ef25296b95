//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Notification attempts by result
//! - Persistence operations by operation and result
//! - Checkpoint firings and draw ticks
//! - Environment resets by reason, distinct connections gauge

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Notification attempts - tracks outbound notifications by result
pub static NOTIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("notifications_total", "Total number of notification attempts")
            .namespace("checkpoint_server"),
        &["result"], // "delivered", "failed", "skipped"
    )
    .expect("Failed to create NOTIFICATIONS_TOTAL metric")
});

/// Persistence operations - tracks adapter calls by operation and result
pub static PERSISTENCE_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "persistence_operations_total",
            "Total number of persistence operations",
        )
        .namespace("checkpoint_server"),
        &["operation", "result"], // result: "ok", "error", "skipped"
    )
    .expect("Failed to create PERSISTENCE_OPERATIONS_TOTAL metric")
});

/// Checkpoints that fired against a live session
pub static CHECKPOINTS_FIRED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("checkpoints_fired_total", "Total number of checkpoint firings")
            .namespace("checkpoint_server"),
    )
    .expect("Failed to create CHECKPOINTS_FIRED_TOTAL metric")
});

/// Items dispensed by the draw service
pub static DRAW_TICKS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("draw_ticks_total", "Total number of items drawn")
            .namespace("checkpoint_server"),
    )
    .expect("Failed to create DRAW_TICKS_TOTAL metric")
});

/// Environment resets by reason
pub static ENVIRONMENT_RESETS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("environment_resets_total", "Total number of environment resets")
            .namespace("checkpoint_server"),
        &["reason"], // "expired", "manual"
    )
    .expect("Failed to create ENVIRONMENT_RESETS_TOTAL metric")
});

/// Distinct clients in the current environment
pub static ENVIRONMENT_CONNECTIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "environment_connections",
            "Distinct clients in the current environment",
        )
        .namespace("checkpoint_server"),
    )
    .expect("Failed to create ENVIRONMENT_CONNECTIONS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(NOTIFICATIONS_TOTAL.clone()))
        .expect("Failed to register NOTIFICATIONS_TOTAL");
    registry
        .register(Box::new(PERSISTENCE_OPERATIONS_TOTAL.clone()))
        .expect("Failed to register PERSISTENCE_OPERATIONS_TOTAL");
    registry
        .register(Box::new(CHECKPOINTS_FIRED_TOTAL.clone()))
        .expect("Failed to register CHECKPOINTS_FIRED_TOTAL");
    registry
        .register(Box::new(DRAW_TICKS_TOTAL.clone()))
        .expect("Failed to register DRAW_TICKS_TOTAL");
    registry
        .register(Box::new(ENVIRONMENT_RESETS_TOTAL.clone()))
        .expect("Failed to register ENVIRONMENT_RESETS_TOTAL");
    registry
        .register(Box::new(ENVIRONMENT_CONNECTIONS.clone()))
        .expect("Failed to register ENVIRONMENT_CONNECTIONS");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record a notification outcome
pub fn record_notification(result: &str) {
    NOTIFICATIONS_TOTAL.with_label_values(&[result]).inc();
}

/// Helper to record a persistence operation outcome
pub fn record_persistence(operation: &str, result: &str) {
    PERSISTENCE_OPERATIONS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
}

pub fn record_checkpoint_fired() {
    CHECKPOINTS_FIRED_TOTAL.inc();
}

pub fn record_draw_tick() {
    DRAW_TICKS_TOTAL.inc();
}

/// Helper to record an environment reset and zero the connection gauge
pub fn record_environment_reset(reason: &str) {
    ENVIRONMENT_RESETS_TOTAL.with_label_values(&[reason]).inc();
    ENVIRONMENT_CONNECTIONS.set(0);
}

pub fn set_environment_connections(count: u32) {
    ENVIRONMENT_CONNECTIONS.set(i64::from(count));
}
