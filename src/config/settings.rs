//! Application settings and configuration structures.

use std::time::Duration;

use chrono::FixedOffset;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::{MAX_INTERVAL_MINUTES, MAX_TICK_SECONDS, MAX_TTL_SECS};

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL, optional)
    pub database: DatabaseSettings,

    /// Outbound notification endpoint
    pub notifier: NotifierSettings,

    /// Wall-clock rendering and alignment
    pub clock: ClockSettings,

    /// Environment timer (session lifecycle + checkpoints)
    pub environment_timer: EnvironmentTimerSettings,

    /// Draw service
    pub draw: DrawSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL. Empty or absent means "no backing store".
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply `migrations/` at startup
    pub run_migrations: bool,
}

/// Notification endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierSettings {
    /// POST target. Empty disables notifications.
    pub url: String,

    /// Channel name sent with every notification
    pub channel: String,

    /// Token sent with every notification
    pub token: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Wall-clock configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClockSettings {
    /// Fixed offset from UTC in minutes (America/Bogota = -300)
    pub utc_offset_minutes: i32,
}

/// Environment timer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentTimerSettings {
    /// Session time-to-live in seconds
    pub ttl_secs: u64,

    /// Default checkpoint grid interval in minutes
    pub interval_minutes: u32,

    /// Row in the parameter table that overrides `interval_minutes`
    pub interval_parameter: String,
}

/// Draw service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DrawSettings {
    /// Seconds between draws
    pub tick_seconds: u64,

    /// Prefix of the run label (`{prefix}_YYYY-MM-DD_HH:MM`)
    pub label_prefix: String,

    /// Row in the parameter table that overrides `tick_seconds`
    pub tick_parameter: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("notifier.url", std::env::var("SOCKET_URL").ok())?
            .set_override_option("notifier.channel", std::env::var("SOCKET_CHANNEL").ok())?
            .set_override_option("notifier.token", std::env::var("SOCKET_TOKEN").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate())
    }

    /// Settings built from defaults only, without touching files or the process environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("test")?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate())
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout", 5)?
            .set_default("database.run_migrations", false)?
            .set_default("notifier.url", "")?
            .set_default("notifier.channel", "Bingo_Automatico")?
            .set_default("notifier.token", "bingo_automatico")?
            .set_default("notifier.timeout_secs", 10)?
            .set_default("clock.utc_offset_minutes", -300)?
            .set_default("environment_timer.ttl_secs", 3600)?
            .set_default("environment_timer.interval_minutes", 30)?
            .set_default("environment_timer.interval_parameter", "intervalo_time_start")?
            .set_default("draw.tick_seconds", 20)?
            .set_default("draw.label_prefix", "Bingo")?
            .set_default("draw.tick_parameter", "intervalo_bingo")?
            .set_default("cors.allowed_origins", Vec::<String>::new())
    }

    /// Reject values the timers cannot work with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        let interval = self.environment_timer.interval_minutes;
        if interval == 0 || interval > MAX_INTERVAL_MINUTES {
            return Err(ConfigError::Message(format!(
                "environment_timer.interval_minutes must be within 1..={}, got {}",
                MAX_INTERVAL_MINUTES, interval
            )));
        }
        let ttl = self.environment_timer.ttl_secs;
        if ttl == 0 || ttl > MAX_TTL_SECS {
            return Err(ConfigError::Message(format!(
                "environment_timer.ttl_secs must be within 1..={}, got {}",
                MAX_TTL_SECS, ttl
            )));
        }
        let tick = self.draw.tick_seconds;
        if tick == 0 || tick > MAX_TICK_SECONDS {
            return Err(ConfigError::Message(format!(
                "draw.tick_seconds must be within 1..={}, got {}",
                MAX_TICK_SECONDS, tick
            )));
        }
        if self.clock.offset().is_none() {
            return Err(ConfigError::Message(format!(
                "clock.utc_offset_minutes out of range: {}",
                self.clock.utc_offset_minutes
            )));
        }
        Ok(self)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DatabaseSettings {
    /// Connection URL, if a store is configured.
    pub fn connection_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

impl NotifierSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ClockSettings {
    /// The configured offset, `None` when out of chrono's range.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }
}

impl EnvironmentTimerSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl DrawSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_seconds)
    }
}
