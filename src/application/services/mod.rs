//! Application Services
//!
//! Stateful services that own the timers and coordinate domain operations.
//!
//! ## Available Services
//!
//! - **EnvironmentTimer**: session lifecycle and checkpoint scheduling
//! - **DrawService**: interval-driven item draws

pub mod draw_service;
pub mod environment_timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use draw_service::{DrawService, DrawServiceConfig};
pub use environment_timer::{EnvironmentTimer, EnvironmentTimerConfig};
