//! Password Reset Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{PasswordReset, PasswordResetRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct PasswordResetRow {
    id: i64,
    user_id: i64,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl PasswordResetRow {
    fn into_reset(self) -> PasswordReset {
        PasswordReset {
            id: self.id,
            user_id: self.user_id,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            used_at: self.used_at,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL password reset repository implementation.
#[derive(Clone)]
pub struct PgPasswordResetRepository {
    pool: PgPool,
}

impl PgPasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetRepository for PgPasswordResetRepository {
    async fn create(&self, reset: &PasswordReset) -> Result<PasswordReset, AppError> {
        let row = sqlx::query_as::<_, PasswordResetRow>(
            r#"
            INSERT INTO password_resets (id, user_id, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_hash, expires_at, used_at, created_at
            "#,
        )
        .bind(reset.id)
        .bind(reset.user_id)
        .bind(&reset.token_hash)
        .bind(reset.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_reset())
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, AppError> {
        let row = sqlx::query_as::<_, PasswordResetRow>(
            r#"
            SELECT id, user_id, token_hash, expires_at, used_at, created_at
            FROM password_resets
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_reset()))
    }

    async fn mark_used(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE password_resets SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Password reset with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
