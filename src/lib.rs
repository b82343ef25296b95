//! # Checkpoint Server Library
//!
//! A session-scoped checkpoint scheduler and interval draw service:
//! - An environment session that opens on the first client connection, is
//!   extended by every connection and resets itself after a TTL
//! - Checkpoints on a wall-clock grid, each announced to a notification endpoint
//! - A draw service dispensing a shuffled pool of items one tick at a time
//! - Best-effort PostgreSQL persistence that degrades instead of failing
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Session, checkpoint grid and draw run entities; ports
//! - **Application Layer**: The timer-owning services and status DTOs
//! - **Infrastructure Layer**: Database, persistence adapter, HTTP notifier, metrics
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! checkpoint_server/
//! +-- config/         Configuration management
//! +-- domain/         Entities, grid arithmetic and ports
//! +-- application/    EnvironmentTimer, DrawService, DTOs
//! +-- infrastructure/ Database, persistence, notifier, metrics
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Errors and clocks
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
