//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkpoint_server::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Checkpoints every {} minutes", settings.environment_timer.interval_minutes);
//! ```

mod settings;

pub use settings::*;
