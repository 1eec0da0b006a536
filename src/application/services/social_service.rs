//! Social Service
//!
//! Likes, comments, and follows, plus the notification mail those
//! actions trigger. Mail is sent from a spawned task so requests never
//! wait on SMTP.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    Comment, CommentRepository, Follow, FollowRepository, Like, LikeRepository,
    ResourceRepository, User, UserRepository,
};
use crate::infrastructure::email::Mailer;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    #[error("Resource not found")]
    ResourceNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Already liked")]
    AlreadyLiked,

    #[error("Not liked")]
    NotLiked,

    #[error("Already following")]
    AlreadyFollowing,

    #[error("Not following")]
    NotFollowing,

    #[error("Cannot follow yourself")]
    SelfFollow,

    #[error("Not allowed to delete this comment")]
    NotCommentOwner,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SocialError> for AppError {
    fn from(e: SocialError) -> Self {
        match e {
            SocialError::ResourceNotFound => AppError::NotFound("Resource not found".into()),
            SocialError::UserNotFound => AppError::NotFound("User not found".into()),
            SocialError::CommentNotFound => AppError::NotFound("Comment not found".into()),
            SocialError::AlreadyLiked => AppError::Conflict("Resource already liked".into()),
            SocialError::NotLiked => AppError::NotFound("Like not found".into()),
            SocialError::AlreadyFollowing => {
                AppError::Conflict("Already following this user".into())
            }
            SocialError::NotFollowing => AppError::NotFound("Follow not found".into()),
            SocialError::SelfFollow => AppError::BadRequest("Cannot follow yourself".into()),
            SocialError::NotCommentOwner => {
                AppError::Forbidden("Not allowed to delete this comment".into())
            }
            SocialError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[async_trait]
pub trait SocialService: Send + Sync {
    async fn like(&self, user_id: i64, resource_id: i64) -> Result<Like, SocialError>;

    async fn unlike(&self, user_id: i64, resource_id: i64) -> Result<(), SocialError>;

    /// Users who liked a resource.
    async fn likers(&self, resource_id: i64) -> Result<Vec<User>, SocialError>;

    async fn comment(
        &self,
        user_id: i64,
        resource_id: i64,
        content: &str,
    ) -> Result<Comment, SocialError>;

    /// Comments on a resource, oldest first.
    async fn comments(&self, resource_id: i64) -> Result<Vec<Comment>, SocialError>;

    /// Delete a comment. Allowed for the comment author and for the
    /// owner of the commented resource.
    async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<(), SocialError>;

    async fn follow(&self, follower_id: i64, followed_id: i64) -> Result<Follow, SocialError>;

    async fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<(), SocialError>;

    async fn followers(&self, user_id: i64) -> Result<Vec<User>, SocialError>;

    async fn following(&self, user_id: i64) -> Result<Vec<User>, SocialError>;
}

pub struct SocialServiceImpl<L, C, F, R, U>
where
    L: LikeRepository,
    C: CommentRepository,
    F: FollowRepository,
    R: ResourceRepository,
    U: UserRepository,
{
    like_repo: Arc<L>,
    comment_repo: Arc<C>,
    follow_repo: Arc<F>,
    resource_repo: Arc<R>,
    user_repo: Arc<U>,
    mailer: Arc<Mailer>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<L, C, F, R, U> SocialServiceImpl<L, C, F, R, U>
where
    L: LikeRepository + 'static,
    C: CommentRepository + 'static,
    F: FollowRepository + 'static,
    R: ResourceRepository + 'static,
    U: UserRepository + 'static,
{
    pub fn new(
        like_repo: Arc<L>,
        comment_repo: Arc<C>,
        follow_repo: Arc<F>,
        resource_repo: Arc<R>,
        user_repo: Arc<U>,
        mailer: Arc<Mailer>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            like_repo,
            comment_repo,
            follow_repo,
            resource_repo,
            user_repo,
            mailer,
            id_generator,
        }
    }

    async fn resource_owner_id(&self, resource_id: i64) -> Result<i64, SocialError> {
        self.resource_repo
            .find_by_id(resource_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))?
            .map(|r| r.owner_id)
            .ok_or(SocialError::ResourceNotFound)
    }

    /// Mail the resource owner about a new comment, unless the owner
    /// commented on their own resource.
    fn notify_comment(&self, owner_id: i64, commenter_id: i64, resource_id: i64) {
        if owner_id == commenter_id {
            return;
        }

        let user_repo = Arc::clone(&self.user_repo);
        let resource_repo = Arc::clone(&self.resource_repo);
        let mailer = Arc::clone(&self.mailer);

        tokio::spawn(async move {
            let (owner, commenter, resource) = tokio::join!(
                user_repo.find_by_id(owner_id),
                user_repo.find_by_id(commenter_id),
                resource_repo.find_by_id(resource_id),
            );

            let (Ok(Some(owner)), Ok(Some(commenter)), Ok(Some(resource))) =
                (owner, commenter, resource)
            else {
                return;
            };

            if let Err(e) = mailer
                .send_new_comment(&owner.email, &commenter.username, &resource.caption)
                .await
            {
                tracing::warn!(error = %e, resource_id = resource_id, "Comment notification mail failed");
            }
        });
    }

    fn notify_follow(&self, follower_id: i64, followed_id: i64) {
        let user_repo = Arc::clone(&self.user_repo);
        let mailer = Arc::clone(&self.mailer);

        tokio::spawn(async move {
            let (followed, follower) = tokio::join!(
                user_repo.find_by_id(followed_id),
                user_repo.find_by_id(follower_id),
            );

            let (Ok(Some(followed)), Ok(Some(follower))) = (followed, follower) else {
                return;
            };

            if let Err(e) = mailer
                .send_new_follower(&followed.email, &follower.username)
                .await
            {
                tracing::warn!(error = %e, followed_id = followed_id, "Follow notification mail failed");
            }
        });
    }
}

#[async_trait]
impl<L, C, F, R, U> SocialService for SocialServiceImpl<L, C, F, R, U>
where
    L: LikeRepository + 'static,
    C: CommentRepository + 'static,
    F: FollowRepository + 'static,
    R: ResourceRepository + 'static,
    U: UserRepository + 'static,
{
    async fn like(&self, user_id: i64, resource_id: i64) -> Result<Like, SocialError> {
        self.resource_owner_id(resource_id).await?;

        if self
            .like_repo
            .exists(user_id, resource_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))?
        {
            return Err(SocialError::AlreadyLiked);
        }

        let like = Like {
            id: self.id_generator.generate(),
            user_id,
            resource_id,
            created_at: Utc::now(),
        };

        self.like_repo
            .create(&like)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => SocialError::AlreadyLiked,
                other => SocialError::Internal(other.to_string()),
            })
    }

    async fn unlike(&self, user_id: i64, resource_id: i64) -> Result<(), SocialError> {
        self.like_repo
            .delete(user_id, resource_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => SocialError::NotLiked,
                other => SocialError::Internal(other.to_string()),
            })
    }

    async fn likers(&self, resource_id: i64) -> Result<Vec<User>, SocialError> {
        self.resource_owner_id(resource_id).await?;

        self.like_repo
            .users_for_resource(resource_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))
    }

    async fn comment(
        &self,
        user_id: i64,
        resource_id: i64,
        content: &str,
    ) -> Result<Comment, SocialError> {
        let owner_id = self.resource_owner_id(resource_id).await?;

        let comment = Comment {
            id: self.id_generator.generate(),
            user_id,
            resource_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        let created = self
            .comment_repo
            .create(&comment)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))?;

        self.notify_comment(owner_id, user_id, resource_id);

        Ok(created)
    }

    async fn comments(&self, resource_id: i64) -> Result<Vec<Comment>, SocialError> {
        self.resource_owner_id(resource_id).await?;

        self.comment_repo
            .list_for_resource(resource_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))
    }

    async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<(), SocialError> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))?
            .ok_or(SocialError::CommentNotFound)?;

        if comment.user_id != user_id {
            // The resource owner may moderate comments on their resource
            let owner_id = self.resource_owner_id(comment.resource_id).await?;
            if owner_id != user_id {
                return Err(SocialError::NotCommentOwner);
            }
        }

        self.comment_repo
            .delete(comment_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))
    }

    async fn follow(&self, follower_id: i64, followed_id: i64) -> Result<Follow, SocialError> {
        if follower_id == followed_id {
            return Err(SocialError::SelfFollow);
        }

        self.user_repo
            .find_by_id(followed_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))?
            .ok_or(SocialError::UserNotFound)?;

        if self
            .follow_repo
            .exists(follower_id, followed_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))?
        {
            return Err(SocialError::AlreadyFollowing);
        }

        let follow = Follow {
            id: self.id_generator.generate(),
            follower_id,
            followed_id,
            created_at: Utc::now(),
        };

        let created = self
            .follow_repo
            .create(&follow)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => SocialError::AlreadyFollowing,
                AppError::BadRequest(_) => SocialError::SelfFollow,
                other => SocialError::Internal(other.to_string()),
            })?;

        self.notify_follow(follower_id, followed_id);

        Ok(created)
    }

    async fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<(), SocialError> {
        self.follow_repo
            .delete(follower_id, followed_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => SocialError::NotFollowing,
                other => SocialError::Internal(other.to_string()),
            })
    }

    async fn followers(&self, user_id: i64) -> Result<Vec<User>, SocialError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))?
            .ok_or(SocialError::UserNotFound)?;

        self.follow_repo
            .followers(user_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))
    }

    async fn following(&self, user_id: i64) -> Result<Vec<User>, SocialError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))?
            .ok_or(SocialError::UserNotFound)?;

        self.follow_repo
            .following(user_id)
            .await
            .map_err(|e| SocialError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpSettings;
    use crate::domain::entities::comment::MockCommentRepository;
    use crate::domain::entities::follow::MockFollowRepository;
    use crate::domain::entities::like::MockLikeRepository;
    use crate::domain::entities::resource::MockResourceRepository;
    use crate::domain::entities::user::MockUserRepository;
    use crate::domain::{Resource, ResourceKind};

    fn mailer() -> Arc<Mailer> {
        Arc::new(
            Mailer::new(SmtpSettings {
                host: "localhost".into(),
                port: 587,
                username: String::new(),
                password: String::new(),
                from_address: "noreply@kportal.dev".into(),
                frontend_url: "http://localhost:3000".into(),
                disabled: true,
            })
            .unwrap(),
        )
    }

    fn sample_resource(owner_id: i64) -> Resource {
        let now = Utc::now();
        Resource {
            id: 100,
            owner_id,
            language_id: 1,
            kind: ResourceKind::Link,
            caption: "A guide".into(),
            topic: "grammar".into(),
            url: Some("https://example.com".into()),
            file_path: None,
            file_name: None,
            file_size_bytes: None,
            title: None,
            photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[allow(clippy::type_complexity)]
    fn service(
        like_repo: MockLikeRepository,
        comment_repo: MockCommentRepository,
        follow_repo: MockFollowRepository,
        resource_repo: MockResourceRepository,
        user_repo: MockUserRepository,
    ) -> SocialServiceImpl<
        MockLikeRepository,
        MockCommentRepository,
        MockFollowRepository,
        MockResourceRepository,
        MockUserRepository,
    > {
        SocialServiceImpl::new(
            Arc::new(like_repo),
            Arc::new(comment_repo),
            Arc::new(follow_repo),
            Arc::new(resource_repo),
            Arc::new(user_repo),
            mailer(),
            Arc::new(SnowflakeGenerator::new(1, 0)),
        )
    }

    #[tokio::test]
    async fn test_like_missing_resource_not_found() {
        let mut resource_repo = MockResourceRepository::new();
        resource_repo.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(
            MockLikeRepository::new(),
            MockCommentRepository::new(),
            MockFollowRepository::new(),
            resource_repo,
            MockUserRepository::new(),
        );

        let result = svc.like(1, 100).await;
        assert!(matches!(result, Err(SocialError::ResourceNotFound)));
    }

    #[tokio::test]
    async fn test_like_twice_conflicts() {
        let mut resource_repo = MockResourceRepository::new();
        resource_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_resource(5))));

        let mut like_repo = MockLikeRepository::new();
        like_repo.expect_exists().returning(|_, _| Ok(true));

        let svc = service(
            like_repo,
            MockCommentRepository::new(),
            MockFollowRepository::new(),
            resource_repo,
            MockUserRepository::new(),
        );

        let result = svc.like(1, 100).await;
        assert!(matches!(result, Err(SocialError::AlreadyLiked)));
    }

    #[tokio::test]
    async fn test_self_follow_rejected_before_any_query() {
        let svc = service(
            MockLikeRepository::new(),
            MockCommentRepository::new(),
            MockFollowRepository::new(),
            MockResourceRepository::new(),
            MockUserRepository::new(),
        );

        let result = svc.follow(7, 7).await;
        assert!(matches!(result, Err(SocialError::SelfFollow)));
    }

    #[tokio::test]
    async fn test_delete_comment_by_stranger_forbidden() {
        let mut comment_repo = MockCommentRepository::new();
        comment_repo.expect_find_by_id().returning(|_| {
            Ok(Some(Comment {
                id: 1,
                user_id: 10,
                resource_id: 100,
                content: "nice".into(),
                created_at: Utc::now(),
            }))
        });

        let mut resource_repo = MockResourceRepository::new();
        resource_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_resource(20))));

        let svc = service(
            MockLikeRepository::new(),
            comment_repo,
            MockFollowRepository::new(),
            resource_repo,
            MockUserRepository::new(),
        );

        // 30 is neither the author (10) nor the resource owner (20)
        let result = svc.delete_comment(1, 30).await;
        assert!(matches!(result, Err(SocialError::NotCommentOwner)));
    }

    #[tokio::test]
    async fn test_resource_owner_may_delete_comment() {
        let mut comment_repo = MockCommentRepository::new();
        comment_repo.expect_find_by_id().returning(|_| {
            Ok(Some(Comment {
                id: 1,
                user_id: 10,
                resource_id: 100,
                content: "spam".into(),
                created_at: Utc::now(),
            }))
        });
        comment_repo.expect_delete().returning(|_| Ok(()));

        let mut resource_repo = MockResourceRepository::new();
        resource_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_resource(20))));

        let svc = service(
            MockLikeRepository::new(),
            comment_repo,
            MockFollowRepository::new(),
            resource_repo,
            MockUserRepository::new(),
        );

        svc.delete_comment(1, 20).await.unwrap();
    }
}
