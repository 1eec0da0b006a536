//! Social Handlers
//!
//! Likes, comments, and follows.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::CreateCommentRequest;
use crate::application::dto::response::{CommentResponse, UserResponse};
use crate::application::services::{SocialService, SocialServiceImpl};
use crate::infrastructure::repositories::{
    PgCommentRepository, PgFollowRepository, PgLikeRepository, PgResourceRepository,
    PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn social_service(
    state: &AppState,
) -> SocialServiceImpl<
    PgLikeRepository,
    PgCommentRepository,
    PgFollowRepository,
    PgResourceRepository,
    PgUserRepository,
> {
    SocialServiceImpl::new(
        Arc::new(PgLikeRepository::new(state.db.clone())),
        Arc::new(PgCommentRepository::new(state.db.clone())),
        Arc::new(PgFollowRepository::new(state.db.clone())),
        Arc::new(PgResourceRepository::new(state.db.clone())),
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.mailer.clone(),
        state.snowflake.clone(),
    )
}

/// Like a resource
pub async fn like_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(resource_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    social_service(&state).like(auth.user_id, resource_id).await?;

    Ok(StatusCode::CREATED)
}

/// Remove a like from a resource
pub async fn unlike_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(resource_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    social_service(&state)
        .unlike(auth.user_id, resource_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Users who liked a resource
pub async fn resource_likes(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = social_service(&state).likers(resource_id).await?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| UserResponse::from_user(u, false))
            .collect(),
    ))
}

/// Comment on a resource
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(resource_id): Path<i64>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let comment = social_service(&state)
        .comment(auth.user_id, resource_id, &body.content)
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// Comments on a resource, oldest first
pub async fn resource_comments(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let comments = social_service(&state).comments(resource_id).await?;

    Ok(Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

/// Delete a comment (author or resource owner)
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    social_service(&state)
        .delete_comment(comment_id, auth.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Follow a user
pub async fn follow_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    social_service(&state).follow(auth.user_id, user_id).await?;

    Ok(StatusCode::CREATED)
}

/// Unfollow a user
pub async fn unfollow_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    social_service(&state)
        .unfollow(auth.user_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// A user's followers
pub async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = social_service(&state).followers(user_id).await?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| UserResponse::from_user(u, false))
            .collect(),
    ))
}

/// Users a user follows
pub async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = social_service(&state).following(user_id).await?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| UserResponse::from_user(u, false))
            .collect(),
    ))
}
