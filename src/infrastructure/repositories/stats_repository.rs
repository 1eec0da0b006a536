//! Statistics Repository
//!
//! Aggregate COUNT queries behind the /stats endpoint and per-user
//! statistics. Trait and types live here rather than in the domain layer
//! since they describe query results, not entities.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::shared::error::AppError;

/// Portal-wide row counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortalTotals {
    pub users: i64,
    pub resources: i64,
    pub likes: i64,
    pub comments: i64,
    pub follows: i64,
}

/// Resource count per language.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LanguageCount {
    pub language_id: i64,
    pub language_name: String,
    pub resource_count: i64,
}

/// A resource ranked by like count.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopResource {
    pub resource_id: i64,
    pub caption: String,
    pub owner_id: i64,
    pub like_count: i64,
}

/// Per-user statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub resources_shared: i64,
    pub likes_received: i64,
    pub comments_received: i64,
    pub followers: i64,
    pub following: i64,
}

/// Repository trait for aggregate statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Portal-wide totals.
    async fn totals(&self) -> Result<PortalTotals, AppError>;

    /// Resource counts grouped by language.
    async fn resources_per_language(&self) -> Result<Vec<LanguageCount>, AppError>;

    /// Resources ranked by like count, descending.
    async fn top_resources_by_likes(&self, limit: i64) -> Result<Vec<TopResource>, AppError>;

    /// Whether a user row exists.
    async fn user_exists(&self, user_id: i64) -> Result<bool, AppError>;

    /// Per-user statistics.
    async fn user_stats(&self, user_id: i64) -> Result<UserStats, AppError>;
}

/// PostgreSQL statistics repository implementation.
#[derive(Clone)]
pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, table: &str) -> Result<i64, AppError> {
        // `table` comes from the fixed list below, never from user input
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn totals(&self) -> Result<PortalTotals, AppError> {
        Ok(PortalTotals {
            users: self.count("users").await?,
            resources: self.count("resources").await?,
            likes: self.count("likes").await?,
            comments: self.count("comments").await?,
            follows: self.count("follows").await?,
        })
    }

    async fn resources_per_language(&self) -> Result<Vec<LanguageCount>, AppError> {
        let rows = sqlx::query_as::<_, LanguageCount>(
            r#"
            SELECT l.id AS language_id, l.name AS language_name,
                   COUNT(r.id) AS resource_count
            FROM languages l
            LEFT JOIN resources r ON r.language_id = l.id
            GROUP BY l.id, l.name
            ORDER BY resource_count DESC, l.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn top_resources_by_likes(&self, limit: i64) -> Result<Vec<TopResource>, AppError> {
        let rows = sqlx::query_as::<_, TopResource>(
            r#"
            SELECT r.id AS resource_id, r.caption, r.owner_id,
                   COUNT(l.id) AS like_count
            FROM resources r
            LEFT JOIN likes l ON l.resource_id = r.id
            GROUP BY r.id, r.caption, r.owner_id
            ORDER BY like_count DESC, r.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn user_exists(&self, user_id: i64) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn user_stats(&self, user_id: i64) -> Result<UserStats, AppError> {
        let resources_shared =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resources WHERE owner_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let likes_received = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM likes l
            INNER JOIN resources r ON r.id = l.resource_id
            WHERE r.owner_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let comments_received = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM comments c
            INNER JOIN resources r ON r.id = c.resource_id
            WHERE r.owner_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let followers =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE followed_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let following =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(UserStats {
            resources_shared,
            likes_received,
            comments_received,
            followers,
            following,
        })
    }
}
