//! Follow Repository Implementation
//!
//! Directed follower edges. Duplicate edges surface as Conflict via the
//! UNIQUE constraint, self-follows via the CHECK constraint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Follow, FollowRepository, User};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct FollowRow {
    id: i64,
    follower_id: i64,
    followed_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct FollowUserRow {
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

impl FollowUserRow {
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

/// PostgreSQL follow repository implementation.
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn create(&self, follow: &Follow) -> Result<Follow, AppError> {
        let row = sqlx::query_as::<_, FollowRow>(
            r#"
            INSERT INTO follows (id, follower_id, followed_id)
            VALUES ($1, $2, $3)
            RETURNING id, follower_id, followed_id, created_at
            "#,
        )
        .bind(follow.id)
        .bind(follow.follower_id)
        .bind(follow.followed_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Already following this user".to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                AppError::BadRequest("Cannot follow yourself".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(Follow {
            id: row.id,
            follower_id: row.follower_id,
            followed_id: row.followed_id,
            created_at: row.created_at,
        })
    }

    async fn delete(&self, follower_id: i64, followed_id: i64) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
                .bind(follower_id)
                .bind(followed_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Follow not found".to_string()));
        }

        Ok(())
    }

    async fn exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn followers(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, FollowUserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.first_name, u.last_name,
                   u.profile_picture_url, u.bio, u.created_at, u.updated_at
            FROM users u
            INNER JOIN follows f ON f.follower_id = u.id
            WHERE f.followed_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    async fn following(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, FollowUserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.first_name, u.last_name,
                   u.profile_picture_url, u.bio, u.created_at, u.updated_at
            FROM users u
            INNER JOIN follows f ON f.followed_id = u.id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }
}
