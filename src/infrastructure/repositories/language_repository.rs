//! Language Repository Implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Language, LanguageRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct LanguageRow {
    id: i64,
    name: String,
    shorty: String,
    description: String,
}

impl LanguageRow {
    fn into_language(self) -> Language {
        Language {
            id: self.id,
            name: self.name,
            shorty: self.shorty,
            description: self.description,
        }
    }
}

/// PostgreSQL language repository implementation.
#[derive(Clone)]
pub struct PgLanguageRepository {
    pool: PgPool,
}

impl PgLanguageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LanguageRepository for PgLanguageRepository {
    async fn list(&self) -> Result<Vec<Language>, AppError> {
        let rows = sqlx::query_as::<_, LanguageRow>(
            "SELECT id, name, shorty, description FROM languages ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_language()).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Language>, AppError> {
        let row = sqlx::query_as::<_, LanguageRow>(
            "SELECT id, name, shorty, description FROM languages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_language()))
    }

    async fn find_by_shorty(&self, shorty: &str) -> Result<Option<Language>, AppError> {
        let row = sqlx::query_as::<_, LanguageRow>(
            "SELECT id, name, shorty, description FROM languages WHERE shorty = $1",
        )
        .bind(shorty)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_language()))
    }

    async fn create(&self, language: &Language) -> Result<Language, AppError> {
        let row = sqlx::query_as::<_, LanguageRow>(
            r#"
            INSERT INTO languages (id, name, shorty, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, shorty, description
            "#,
        )
        .bind(language.id)
        .bind(&language.name)
        .bind(&language.shorty)
        .bind(&language.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Language with this short code already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_language())
    }
}
