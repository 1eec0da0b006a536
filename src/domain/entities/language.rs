//! Language lookup table entity and repository trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A language a resource can be tagged with, maps to the `languages` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub name: String,
    /// Short code, e.g. "en", "de" (unique)
    pub shorty: String,
    pub description: String,
}

/// Repository trait for the language lookup table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageRepository: Send + Sync {
    /// List all languages, ordered by name.
    async fn list(&self) -> Result<Vec<Language>, AppError>;

    /// Find a language by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Language>, AppError>;

    /// Find a language by its short code.
    async fn find_by_shorty(&self, shorty: &str) -> Result<Option<Language>, AppError>;

    /// Insert a new language; unique short codes enforced by the schema.
    async fn create(&self, language: &Language) -> Result<Language, AppError>;
}
