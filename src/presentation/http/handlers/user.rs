//! User Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::UpdateUserRequest;
use crate::application::dto::response::UserResponse;
use crate::application::services::{UpdateProfileDto, UserService, UserServiceImpl};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn user_service(state: &AppState) -> UserServiceImpl<PgUserRepository> {
    UserServiceImpl::new(Arc::new(PgUserRepository::new(state.db.clone())))
}

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_user(auth.user_id).await?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Update current user profile
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let update = UpdateProfileDto {
        first_name: body.first_name,
        last_name: body.last_name,
        bio: body.bio,
        profile_picture_url: body.profile_picture_url,
    };

    let user = user_service(&state)
        .update_profile(auth.user_id, update)
        .await?;

    Ok(Json(UserResponse::from_user(user, true)))
}

/// Delete the current account. Resources, likes, comments, and follows
/// go with it; chat messages stay with a null author.
pub async fn delete_current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    user_service(&state).delete_user(auth.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get a user's public profile by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_user(user_id).await?;

    Ok(Json(UserResponse::from_user(user, false)))
}

/// Get a user's public profile by username
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_by_username(&username).await?;

    Ok(Json(UserResponse::from_user(user, false)))
}
