//! # Domain Layer
//!
//! Core scheduling logic, independent of the HTTP server, the database and the
//! notification transport.
//!
//! ## Structure
//!
//! - **entities**: Session, Checkpoint, DrawRun, Notification
//! - **services**: checkpoint grid arithmetic
//! - **persistence**: the soft persistence contract
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Traits define the contracts for persistence and notifications
//! - Timer handles live in the application layer; entities hold plain data

pub mod entities;
pub mod persistence;
pub mod services;

// Re-export commonly used types
pub use entities::*;
pub use persistence::Persistence;
pub use services::{CheckpointGrid, MAX_INTERVAL_MINUTES, UPCOMING_CHECKPOINTS};
