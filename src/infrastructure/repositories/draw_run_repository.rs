//! Draw Run Repository Implementation

use sqlx::PgPool;

use crate::domain::join_sequence;
use crate::shared::error::AppError;

/// PostgreSQL repository for completed draw runs (`bingos`).
#[derive(Clone)]
pub struct PgDrawRunRepository {
    pool: PgPool,
}

impl PgDrawRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a run's draw sequence, comma-joined, under its label.
    pub async fn insert(&self, label: &str, items: &[u8]) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO bingos (evento, numeros)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(label)
        .bind(join_sequence(items))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
