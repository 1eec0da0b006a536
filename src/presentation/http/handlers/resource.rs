//! Resource Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    CreateResourceRequest, ResourceQueryParams, UpdateResourceRequest,
};
use crate::application::dto::response::{FileMetadataResponse, ResourceResponse};
use crate::application::services::{
    CreateResourceDto, ResourceService, ResourceServiceImpl, UpdateResourceDto,
};
use crate::domain::{ResourceFilter, ResourceKind};
use crate::infrastructure::repositories::{PgLanguageRepository, PgResourceRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

const MAX_PAGE_SIZE: i64 = 100;

fn resource_service(
    state: &AppState,
) -> ResourceServiceImpl<PgResourceRepository, PgLanguageRepository> {
    ResourceServiceImpl::new(
        Arc::new(PgResourceRepository::new(state.db.clone())),
        Arc::new(PgLanguageRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

/// Share a new resource
pub async fn create_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let kind = ResourceKind::from_str(&body.kind)
        .ok_or_else(|| AppError::BadRequest("Kind must be link, file, or photo".into()))?;

    let input = CreateResourceDto {
        kind,
        language_id: body.language_id,
        caption: body.caption,
        topic: body.topic,
        url: body.url,
        file_path: body.file_path,
        file_name: body.file_name,
        file_size_bytes: body.file_size_bytes,
        title: body.title,
        photo_url: body.photo_url,
    };

    let resource = resource_service(&state).create(auth.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(ResourceResponse::from(resource))))
}

/// Get a resource by ID
pub async fn get_resource(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
) -> Result<Json<ResourceResponse>, AppError> {
    let resource = resource_service(&state).get(resource_id).await?;

    Ok(Json(ResourceResponse::from(resource)))
}

/// Update a resource (owner only)
pub async fn update_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(resource_id): Path<i64>,
    Json(body): Json<UpdateResourceRequest>,
) -> Result<Json<ResourceResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let update = UpdateResourceDto {
        caption: body.caption,
        topic: body.topic,
        url: body.url,
        title: body.title,
    };

    let resource = resource_service(&state)
        .update(resource_id, auth.user_id, update)
        .await?;

    Ok(Json(ResourceResponse::from(resource)))
}

/// Delete a resource (owner only)
pub async fn delete_resource(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(resource_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    resource_service(&state)
        .delete(resource_id, auth.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List resources, newest first, with optional filters
pub async fn list_resources(
    State(state): State<AppState>,
    Query(params): Query<ResourceQueryParams>,
) -> Result<Json<Vec<ResourceResponse>>, AppError> {
    let filter = ResourceFilter {
        language_id: params.language_id,
        topic: params.topic,
        owner_id: params.owner_id,
        limit: clamp_limit(params.limit),
        offset: params.offset.max(0),
    };

    let resources = resource_service(&state).list(filter).await?;

    Ok(Json(
        resources.into_iter().map(ResourceResponse::from).collect(),
    ))
}

/// Personalized feed: resources from followed users, newest first
pub async fn feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ResourceQueryParams>,
) -> Result<Json<Vec<ResourceResponse>>, AppError> {
    let resources = resource_service(&state)
        .feed(auth.user_id, clamp_limit(params.limit), params.offset.max(0))
        .await?;

    Ok(Json(
        resources.into_iter().map(ResourceResponse::from).collect(),
    ))
}

/// Derived metadata for a file resource
pub async fn file_metadata(
    State(state): State<AppState>,
    Path(resource_id): Path<i64>,
) -> Result<Json<FileMetadataResponse>, AppError> {
    let metadata = resource_service(&state).file_metadata(resource_id).await?;

    Ok(Json(FileMetadataResponse::from(metadata)))
}
