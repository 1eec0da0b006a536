//! Like Repository Implementation
//!
//! The UNIQUE (user_id, resource_id) constraint turns duplicate likes into
//! a Conflict at insert time, so there is no check-then-insert race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Like, LikeRepository, User};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct LikeRow {
    id: i64,
    user_id: i64,
    resource_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LikeUserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    profile_picture_url: Option<String>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LikeUserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            profile_picture_url: self.profile_picture_url,
            bio: self.bio,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL like repository implementation.
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn create(&self, like: &Like) -> Result<Like, AppError> {
        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            INSERT INTO likes (id, user_id, resource_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, resource_id, created_at
            "#,
        )
        .bind(like.id)
        .bind(like.user_id)
        .bind(like.resource_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Resource already liked".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(Like {
            id: row.id,
            user_id: row.user_id,
            resource_id: row.resource_id,
            created_at: row.created_at,
        })
    }

    async fn delete(&self, user_id: i64, resource_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND resource_id = $2")
            .bind(user_id)
            .bind(resource_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Like not found".to_string()));
        }

        Ok(())
    }

    async fn exists(&self, user_id: i64, resource_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND resource_id = $2)",
        )
        .bind(user_id)
        .bind(resource_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn users_for_resource(&self, resource_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, LikeUserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.first_name, u.last_name,
                   u.profile_picture_url, u.bio, u.created_at, u.updated_at
            FROM users u
            INNER JOIN likes l ON l.user_id = u.id
            WHERE l.resource_id = $1
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    async fn count_for_resource(&self, resource_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE resource_id = $1")
                .bind(resource_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
