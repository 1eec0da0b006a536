//! Lookup Handlers
//!
//! Authenticated proxies for external services: Wikipedia article
//! summaries and search, and GPT completions. Upstream failures come
//! back as 502 rather than leaking upstream specifics.

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::application::dto::request::GptRequest;
use crate::application::dto::response::GptResponse;
use crate::infrastructure::external::{WikipediaArticle, WikipediaSearchResult};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Wikipedia article summary by title
pub async fn wikipedia_article(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<WikipediaArticle>, AppError> {
    let article = state.wikipedia.article(&title).await?;

    Ok(Json(article))
}

/// Wikipedia title search
pub async fn wikipedia_search(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<WikipediaSearchResult>>, AppError> {
    let results = state.wikipedia.search(&query).await?;

    Ok(Json(results))
}

/// Forward a prompt to the configured GPT completion endpoint
pub async fn gpt_completion(
    State(state): State<AppState>,
    Json(body): Json<GptRequest>,
) -> Result<Json<GptResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let response = state.gpt.generate(&body.prompt).await?;

    Ok(Json(GptResponse { response }))
}
