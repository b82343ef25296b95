//! Database Module
//!
//! PostgreSQL connection pool and migrations.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseSettings;

/// Create a PostgreSQL connection pool.
///
/// Returns `Ok(None)` when no database URL is configured.
pub async fn create_pool(settings: &DatabaseSettings) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = settings.connection_url() else {
        return Ok(None);
    };

    let pool = pool_options(settings).connect(url).await?;
    Ok(Some(pool))
}

fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
