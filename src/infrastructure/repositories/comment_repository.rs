//! Comment Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Comment, CommentRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    user_id: i64,
    resource_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            user_id: self.user_id,
            resource_id: self.resource_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL comment repository implementation.
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (id, user_id, resource_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, resource_id, content, created_at
            "#,
        )
        .bind(comment.id)
        .bind(comment.user_id)
        .bind(comment.resource_id)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_comment())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT id, user_id, resource_id, content, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_comment()))
    }

    async fn list_for_resource(&self, resource_id: i64) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, user_id, resource_id, content, created_at
            FROM comments
            WHERE resource_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_comment()).collect())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Comment with id {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn count_for_resource(&self, resource_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE resource_id = $1")
                .bind(resource_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
