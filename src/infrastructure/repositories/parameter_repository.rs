//! Parameter Repository Implementation
//!
//! Named runtime parameters (`parametros`).

use sqlx::PgPool;

use crate::shared::error::AppError;

#[derive(Clone)]
pub struct PgParameterRepository {
    pool: PgPool,
}

impl PgParameterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a parameter value by name.
    pub async fn find_value(&self, name: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT valor
            FROM parametros
            WHERE nombre = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }
}
