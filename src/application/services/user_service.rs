//! User Service
//!
//! Profile lookup, profile updates, and account deletion.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{User, UserRepository};
use crate::shared::error::AppError;

/// Fields a user may change on their own profile. `None` leaves the
/// current value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => AppError::NotFound("User not found".into()),
            UserError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, user_id: i64) -> Result<User, UserError>;

    async fn get_by_username(&self, username: &str) -> Result<User, UserError>;

    async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfileDto,
    ) -> Result<User, UserError>;

    async fn delete_user(&self, user_id: i64) -> Result<(), UserError>;

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, UserError>;
}

pub struct UserServiceImpl<U: UserRepository> {
    user_repo: Arc<U>,
}

impl<U: UserRepository> UserServiceImpl<U> {
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl<U: UserRepository + 'static> UserService for UserServiceImpl<U> {
    async fn get_user(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, UserError> {
        self.user_repo
            .find_by_username(username)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        update: UpdateProfileDto,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(user_id).await?;

        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(url) = update.profile_picture_url {
            user.profile_picture_url = Some(url);
        }
        user.updated_at = Utc::now();

        self.user_repo
            .update(&user)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), UserError> {
        // Confirm existence first so deletes of missing accounts 404
        self.get_user(user_id).await?;

        self.user_repo
            .delete(user_id)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, UserError> {
        self.user_repo
            .search(query, limit)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::user::MockUserRepository;
    use mockall::predicate::eq;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 7,
            username: "kportal".into(),
            email: "k@example.com".into(),
            password_hash: "hash".into(),
            first_name: "Kay".into(),
            last_name: "Portal".into(),
            profile_picture_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().with(eq(99)).returning(|_| Ok(None));

        let svc = UserServiceImpl::new(Arc::new(repo));
        assert!(matches!(svc.get_user(99).await, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_profile_merges_partial_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(sample_user())));
        repo.expect_update().returning(|u| Ok(u.clone()));

        let svc = UserServiceImpl::new(Arc::new(repo));
        let updated = svc
            .update_profile(
                7,
                UpdateProfileDto {
                    bio: Some("Sharing links since 2024".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Kay");
        assert_eq!(updated.bio.as_deref(), Some("Sharing links since 2024"));
    }

    #[tokio::test]
    async fn test_delete_missing_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let svc = UserServiceImpl::new(Arc::new(repo));
        assert!(matches!(
            svc.delete_user(5).await,
            Err(UserError::NotFound)
        ));
    }
}
