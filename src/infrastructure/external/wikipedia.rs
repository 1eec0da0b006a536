//! Wikipedia Lookup Client
//!
//! Thin proxy over the Wikipedia REST API: article summaries and title
//! search. Missing pages map to NotFound, everything else upstream-failing
//! maps to Upstream (502 at the edge).

use reqwest::StatusCode;
use serde::Deserialize;

use crate::shared::error::AppError;

/// An article summary returned by the proxy.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WikipediaArticle {
    pub title: String,
    pub summary: String,
}

/// A single search hit.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WikipediaSearchResult {
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    title: String,
    extract: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    pages: Vec<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    title: String,
}

/// Client for the Wikipedia REST API.
#[derive(Clone)]
pub struct WikipediaClient {
    http: reqwest::Client,
    base_url: String,
}

impl WikipediaClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Fetch an article summary by title.
    pub async fn article(&self, title: &str) -> Result<WikipediaArticle, AppError> {
        let url = format!("{}/api/rest_v1/page/summary/{}", self.base_url, title);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Wikipedia request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => {
                let summary: SummaryResponse = response
                    .json()
                    .await
                    .map_err(|e| AppError::Upstream(format!("Wikipedia response invalid: {}", e)))?;
                Ok(WikipediaArticle {
                    title: summary.title,
                    summary: summary.extract,
                })
            }
            StatusCode::NOT_FOUND => Err(AppError::NotFound("Page not found".to_string())),
            status => Err(AppError::Upstream(format!(
                "Wikipedia returned status {}",
                status
            ))),
        }
    }

    /// Search article titles.
    pub async fn search(&self, query: &str) -> Result<Vec<WikipediaSearchResult>, AppError> {
        let url = format!("{}/w/rest.php/v1/search/page", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("limit", "10")])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Wikipedia request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Wikipedia returned status {}",
                response.status()
            )));
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Wikipedia response invalid: {}", e)))?;

        Ok(results
            .pages
            .into_iter()
            .map(|p| WikipediaSearchResult { title: p.title })
            .collect())
    }
}
