//! Statistics Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::response::{StatsResponse, UserStatsResponse};
use crate::application::services::{StatsService, StatsServiceImpl};
use crate::infrastructure::cache::JsonCache;
use crate::infrastructure::repositories::PgStatsRepository;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn stats_service(state: &AppState) -> StatsServiceImpl<PgStatsRepository, JsonCache> {
    StatsServiceImpl::new(
        Arc::new(PgStatsRepository::new(state.db.clone())),
        state.cache.clone(),
        state.settings.stats.clone(),
    )
}

/// Portal-wide aggregate statistics (cached)
pub async fn portal_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = stats_service(&state).portal_stats().await?;

    Ok(Json(StatsResponse::from(stats)))
}

/// Per-user statistics
pub async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserStatsResponse>, AppError> {
    let stats = stats_service(&state).user_stats(user_id).await?;

    Ok(Json(UserStatsResponse::from(stats)))
}
