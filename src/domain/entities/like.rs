//! Like join row and repository trait.
//!
//! UNIQUE (user_id, resource_id) is enforced by the schema; the repository
//! surfaces that violation as a Conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::shared::error::AppError;

use super::user::User;

/// A like on a resource, maps to the `likes` table.
#[derive(Debug, Clone)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub resource_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for likes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Insert a like; returns Conflict if the pair already exists.
    async fn create(&self, like: &Like) -> Result<Like, AppError>;

    /// Remove a like; NotFound when the pair does not exist.
    async fn delete(&self, user_id: i64, resource_id: i64) -> Result<(), AppError>;

    /// Whether the user already likes the resource.
    async fn exists(&self, user_id: i64, resource_id: i64) -> Result<bool, AppError>;

    /// Users who liked the resource, most recent first.
    async fn users_for_resource(&self, resource_id: i64) -> Result<Vec<User>, AppError>;

    /// Number of likes on a resource.
    async fn count_for_resource(&self, resource_id: i64) -> Result<i64, AppError>;
}
