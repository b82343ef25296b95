//! Environment Repository Implementation
//!
//! Connection and checkpoint rows of the current environment.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::shared::error::AppError;

/// PostgreSQL repository for the `conexiones` and `time_starts` tables.
#[derive(Clone)]
pub struct PgEnvironmentRepository {
    pool: PgPool,
}

impl PgEnvironmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a client connection and the session expiry it produced.
    pub async fn insert_connection(
        &self,
        ip: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO conexiones (ip, expires_at)
            VALUES ($1, $2)
            "#,
        )
        .bind(ip)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record a fired checkpoint.
    pub async fn insert_checkpoint(&self, start_time: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO time_starts (start_time)
            VALUES ($1)
            "#,
        )
        .bind(start_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete every connection and checkpoint row in one transaction.
    pub async fn purge(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM time_starts")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM conexiones")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete rows that lie in the past. Returns the number of rows removed.
    pub async fn prune_expired(&self) -> Result<u64, AppError> {
        let connections = sqlx::query("DELETE FROM conexiones WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();
        let checkpoints = sqlx::query("DELETE FROM time_starts WHERE start_time < NOW()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(connections + checkpoints)
    }
}
