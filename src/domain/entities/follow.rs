//! Follow edge and repository trait.
//!
//! A directed edge between two users. UNIQUE (follower_id, followed_id) and
//! the no-self-follow CHECK live in the schema; self-follow is also rejected
//! earlier in the service layer for a clean 400.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::error::AppError;

use super::user::User;

/// Directed follower edge, maps to the `follows` table.
#[derive(Debug, Clone)]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub followed_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for follow edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert an edge; Conflict if it already exists.
    async fn create(&self, follow: &Follow) -> Result<Follow, AppError>;

    /// Remove an edge; NotFound when it does not exist.
    async fn delete(&self, follower_id: i64, followed_id: i64) -> Result<(), AppError>;

    /// Whether follower already follows followed.
    async fn exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError>;

    /// Users following the given user, most recent first.
    async fn followers(&self, user_id: i64) -> Result<Vec<User>, AppError>;

    /// Users the given user follows, most recent first.
    async fn following(&self, user_id: i64) -> Result<Vec<User>, AppError>;
}
