//! Resource Repository Implementation
//!
//! PostgreSQL implementation of the ResourceRepository trait. The feed query
//! joins the follow graph: resources owned by users the caller follows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewResource, Resource, ResourceFilter, ResourceKind, ResourceRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ResourceRow {
    id: i64,
    owner_id: i64,
    language_id: i64,
    caption: String,
    topic: String,
    kind: String,
    url: Option<String>,
    file_path: Option<String>,
    file_name: Option<String>,
    file_size_bytes: Option<i64>,
    title: Option<String>,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResourceRow {
    fn into_resource(self) -> Resource {
        Resource {
            id: self.id,
            owner_id: self.owner_id,
            language_id: self.language_id,
            caption: self.caption,
            topic: self.topic,
            // The schema CHECK constraint guarantees a known kind
            kind: ResourceKind::from_str(&self.kind).unwrap_or(ResourceKind::Link),
            url: self.url,
            file_path: self.file_path,
            file_name: self.file_name,
            file_size_bytes: self.file_size_bytes,
            title: self.title,
            photo_url: self.photo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const RESOURCE_COLUMNS: &str = "id, owner_id, language_id, caption, topic, kind, url, \
                                file_path, file_name, file_size_bytes, title, photo_url, \
                                created_at, updated_at";

/// Same column list qualified with the `r` alias for joined queries.
const RESOURCE_COLUMNS_QUALIFIED: &str =
    "r.id, r.owner_id, r.language_id, r.caption, r.topic, r.kind, r.url, \
     r.file_path, r.file_name, r.file_size_bytes, r.title, r.photo_url, \
     r.created_at, r.updated_at";

/// PostgreSQL resource repository implementation.
#[derive(Clone)]
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    async fn create(&self, resource: &NewResource) -> Result<Resource, AppError> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "INSERT INTO resources (id, owner_id, language_id, caption, topic, kind, url, \
                                    file_path, file_name, file_size_bytes, title, photo_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {RESOURCE_COLUMNS}"
        ))
        .bind(resource.id)
        .bind(resource.owner_id)
        .bind(resource.language_id)
        .bind(&resource.caption)
        .bind(&resource.topic)
        .bind(resource.kind.as_str())
        .bind(&resource.url)
        .bind(&resource.file_path)
        .bind(&resource.file_name)
        .bind(resource.file_size_bytes)
        .bind(&resource.title)
        .bind(&resource.photo_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_resource())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Resource>, AppError> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_resource()))
    }

    async fn update(&self, resource: &Resource) -> Result<Resource, AppError> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "UPDATE resources \
             SET language_id = $2, \
                 caption = $3, \
                 topic = $4, \
                 url = $5, \
                 file_path = $6, \
                 file_name = $7, \
                 file_size_bytes = $8, \
                 title = $9, \
                 photo_url = $10, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {RESOURCE_COLUMNS}"
        ))
        .bind(resource.id)
        .bind(resource.language_id)
        .bind(&resource.caption)
        .bind(&resource.topic)
        .bind(&resource.url)
        .bind(&resource.file_path)
        .bind(&resource.file_name)
        .bind(resource.file_size_bytes)
        .bind(&resource.title)
        .bind(&resource.photo_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resource with id {} not found", resource.id)))?;

        Ok(row.into_resource())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Resource with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn list(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, AppError> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources \
             WHERE ($1::BIGINT IS NULL OR language_id = $1) \
               AND ($2::TEXT IS NULL OR topic ILIKE $2) \
               AND ($3::BIGINT IS NULL OR owner_id = $3) \
             ORDER BY created_at DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.language_id)
        .bind(filter.topic.as_ref().map(|t| format!("%{}%", t)))
        .bind(filter.owner_id)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_resource()).collect())
    }

    async fn feed(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<Resource>, AppError> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {RESOURCE_COLUMNS_QUALIFIED} FROM resources r \
             INNER JOIN follows f ON f.followed_id = r.owner_id \
             WHERE f.follower_id = $1 \
             ORDER BY r.created_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_resource()).collect())
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<Resource>, AppError> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources \
             WHERE caption ILIKE $1 OR topic ILIKE $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_resource()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The qualified list must stay column-for-column in sync with the
    /// base list, or the feed join silently selects the wrong shape.
    #[test]
    fn test_qualified_column_list_matches_base_columns() {
        let base: Vec<&str> = RESOURCE_COLUMNS.split(',').map(str::trim).collect();
        let qualified: Vec<&str> = RESOURCE_COLUMNS_QUALIFIED
            .split(',')
            .map(str::trim)
            .collect();

        assert_eq!(base.len(), qualified.len());
        for (base_col, qualified_col) in base.iter().zip(&qualified) {
            assert_eq!(format!("r.{}", base_col), *qualified_col);
        }
    }
}
