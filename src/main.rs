//! # Checkpoint Server
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool (optional)
//! - Environment timer and draw service
//! - HTTP server

use anyhow::Result;
use tracing::info;

use checkpoint_server::config::Settings;
use checkpoint_server::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    checkpoint_server::telemetry::init_tracing();

    info!("Starting Checkpoint Server...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        utc_offset_minutes = settings.clock.utc_offset_minutes,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
