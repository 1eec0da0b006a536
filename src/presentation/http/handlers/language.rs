//! Language Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::CreateLanguageRequest;
use crate::application::dto::response::LanguageResponse;
use crate::domain::{Language, LanguageRepository};
use crate::infrastructure::repositories::PgLanguageRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// List all languages
pub async fn list_languages(
    State(state): State<AppState>,
) -> Result<Json<Vec<LanguageResponse>>, AppError> {
    let repo = PgLanguageRepository::new(state.db.clone());
    let languages = repo.list().await?;

    Ok(Json(
        languages.into_iter().map(LanguageResponse::from).collect(),
    ))
}

/// Get a language by ID
pub async fn get_language(
    State(state): State<AppState>,
    Path(language_id): Path<i64>,
) -> Result<Json<LanguageResponse>, AppError> {
    let repo = PgLanguageRepository::new(state.db.clone());
    let language = repo
        .find_by_id(language_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Language not found".into()))?;

    Ok(Json(LanguageResponse::from(language)))
}

/// Add a language
pub async fn create_language(
    State(state): State<AppState>,
    Json(body): Json<CreateLanguageRequest>,
) -> Result<(StatusCode, Json<LanguageResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let repo = PgLanguageRepository::new(state.db.clone());
    let language = repo
        .create(&Language {
            id: state.snowflake.generate(),
            name: body.name,
            shorty: body.shorty.to_lowercase(),
            description: body.description.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(LanguageResponse::from(language))))
}
