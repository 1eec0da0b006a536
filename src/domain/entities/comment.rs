//! Comment entity and repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::error::AppError;

/// A comment on a resource, maps to the `comments` table.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub resource_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment.
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError>;

    /// Find a comment by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;

    /// Comments on a resource, oldest first.
    async fn list_for_resource(&self, resource_id: i64) -> Result<Vec<Comment>, AppError>;

    /// Delete a comment.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Number of comments on a resource.
    async fn count_for_resource(&self, resource_id: i64) -> Result<i64, AppError>;
}
