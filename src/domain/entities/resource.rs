//! Resource entity and repository trait.
//!
//! A shared resource is a link, a file, or a photo. One table with a `kind`
//! discriminator and kind-specific nullable columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Discriminator for the three resource shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Link,
    File,
    Photo,
}

impl ResourceKind {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "link" => Some(Self::Link),
            "file" => Some(Self::File),
            "photo" => Some(Self::Photo),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::File => "file",
            Self::Photo => "photo",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A shared resource, maps to the `resources` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub owner_id: i64,
    pub language_id: i64,
    pub caption: String,
    pub topic: String,
    pub kind: ResourceKind,

    /// Link kind: target URL
    pub url: Option<String>,

    /// File kind: storage path
    pub file_path: Option<String>,

    /// File kind: original file name
    pub file_name: Option<String>,

    /// File kind: size in bytes
    pub file_size_bytes: Option<i64>,

    /// File kind: embedded document title, when known
    pub title: Option<String>,

    /// Photo kind: image URL
    pub photo_url: Option<String>,

    /// Date shared
    pub created_at: DateTime<Utc>,

    /// Date modified
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a resource; the repository assigns timestamps.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub id: i64,
    pub owner_id: i64,
    pub language_id: i64,
    pub caption: String,
    pub topic: String,
    pub kind: ResourceKind,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub title: Option<String>,
    pub photo_url: Option<String>,
}

/// Listing filter for `GET /resources`.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub language_id: Option<i64>,
    pub topic: Option<String>,
    pub owner_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

/// Repository trait for resources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Insert a new resource.
    async fn create(&self, resource: &NewResource) -> Result<Resource, AppError>;

    /// Find a resource by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Resource>, AppError>;

    /// Update caption, topic, language and kind-specific fields.
    async fn update(&self, resource: &Resource) -> Result<Resource, AppError>;

    /// Delete a resource (cascades likes and comments).
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// List resources newest first, honoring the filter.
    async fn list(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, AppError>;

    /// Resources shared by users the given user follows, newest first.
    async fn feed(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<Resource>, AppError>;

    /// Case-insensitive substring search over captions and topics.
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<Resource>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("link", Some(ResourceKind::Link))]
    #[test_case("FILE", Some(ResourceKind::File))]
    #[test_case("Photo", Some(ResourceKind::Photo))]
    #[test_case("video", None)]
    #[test_case("", None)]
    fn test_kind_from_str(input: &str, expected: Option<ResourceKind>) {
        assert_eq!(ResourceKind::from_str(input), expected);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [ResourceKind::Link, ResourceKind::File, ResourceKind::Photo] {
            assert_eq!(ResourceKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ResourceKind::Link).unwrap();
        assert_eq!(json, "\"link\"");
    }
}
