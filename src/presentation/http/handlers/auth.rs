//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{
    PasswordResetConfirmRequest, PasswordResetRequest, RefreshTokenRequest, SigninRequest,
    SignupRequest,
};
use crate::application::dto::response::{
    MessageResponse, RegisterResponse, TokenResponse, UserResponse,
};
use crate::application::services::{AuthService, AuthServiceImpl};
use crate::infrastructure::repositories::{
    PgPasswordResetRepository, PgSessionRepository, PgUserRepository,
};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn auth_service(
    state: &AppState,
) -> AuthServiceImpl<PgUserRepository, PgSessionRepository, PgPasswordResetRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        Arc::new(PgPasswordResetRepository::new(state.db.clone())),
        state.snowflake.clone(),
        state.settings.jwt.clone(),
    )
}

/// Register a new user
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let (user, tokens) = auth_service(&state)
        .register(
            &body.username,
            &body.email,
            &body.password,
            &body.first_name,
            &body.last_name,
        )
        .await?;

    let response = RegisterResponse {
        user: UserResponse::from_user(user, true),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        token_type: tokens.token_type,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in with username and password
pub async fn signin(
    State(state): State<AppState>,
    Json(body): Json<SigninRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let tokens = auth_service(&state)
        .authenticate(&body.username, &body.password)
        .await?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// Refresh access token (rotates the refresh token)
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let tokens = auth_service(&state)
        .refresh_token(&body.refresh_token)
        .await?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// Logout (revoke the refresh token)
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<StatusCode, AppError> {
    auth_service(&state)
        .revoke_token(&body.refresh_token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Request a password reset link.
///
/// Always answers 200 with the same message so the endpoint cannot be
/// used to probe which emails have accounts.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    if let Some(issued) = auth_service(&state)
        .request_password_reset(&body.email)
        .await?
    {
        let mailer = state.mailer.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_password_reset(&issued.email, &issued.token).await {
                tracing::warn!(error = %e, "Password reset mail failed");
            }
        });
    }

    Ok(Json(MessageResponse::new(
        "If the address has an account, a reset link has been sent",
    )))
}

/// Consume a password reset token and set a new password
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetConfirmRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    auth_service(&state)
        .reset_password(&body.token, &body.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}
