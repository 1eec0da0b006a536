//! Search Handler
//!
//! Combined case-insensitive substring search over users and resources.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::application::dto::request::SearchQueryParams;
use crate::application::dto::response::{ResourceResponse, SearchResponse, UserResponse};
use crate::application::services::{
    ResourceService, ResourceServiceImpl, UserService, UserServiceImpl,
};
use crate::infrastructure::repositories::{
    PgLanguageRepository, PgResourceRepository, PgUserRepository,
};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

const MAX_SEARCH_RESULTS: i64 = 50;

/// Search users (by username and name) and resources (by caption and
/// topic) in one call.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<SearchResponse>, AppError> {
    params.validate().map_err(validation_error)?;

    let limit = params.limit.clamp(1, MAX_SEARCH_RESULTS);

    let user_service = UserServiceImpl::new(Arc::new(PgUserRepository::new(state.db.clone())));
    let resource_service = ResourceServiceImpl::new(
        Arc::new(PgResourceRepository::new(state.db.clone())),
        Arc::new(PgLanguageRepository::new(state.db.clone())),
        state.snowflake.clone(),
    );

    let (users, resources) = tokio::try_join!(
        async {
            user_service
                .search(&params.q, limit)
                .await
                .map_err(AppError::from)
        },
        async {
            resource_service
                .search(&params.q, limit)
                .await
                .map_err(AppError::from)
        },
    )?;

    Ok(Json(SearchResponse {
        users: users
            .into_iter()
            .map(|u| UserResponse::from_user(u, false))
            .collect(),
        resources: resources.into_iter().map(ResourceResponse::from).collect(),
    }))
}
