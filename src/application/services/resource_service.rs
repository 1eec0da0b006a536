//! Resource Service
//!
//! Creation, retrieval, listing, feed, and file metadata for shared
//! resources. A resource is a link, a file, or a photo, always tied to
//! an owner and a language.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    LanguageRepository, NewResource, Resource, ResourceFilter, ResourceKind, ResourceRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Input for creating a resource. Which payload fields are required
/// depends on `kind`.
#[derive(Debug, Clone)]
pub struct CreateResourceDto {
    pub kind: ResourceKind,
    pub language_id: i64,
    pub caption: String,
    pub topic: String,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub title: Option<String>,
    pub photo_url: Option<String>,
}

/// Fields an owner may change after creation.
#[derive(Debug, Clone, Default)]
pub struct UpdateResourceDto {
    pub caption: Option<String>,
    pub topic: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
}

/// Derived presentation info for file resources.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileMetadataDto {
    pub extension: String,
    pub size_mib: f64,
    pub title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Resource not found")]
    NotFound,

    #[error("Language not found")]
    LanguageNotFound,

    #[error("Not the resource owner")]
    NotOwner,

    #[error("{0}")]
    InvalidPayload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ResourceError> for AppError {
    fn from(e: ResourceError) -> Self {
        match e {
            ResourceError::NotFound => AppError::NotFound("Resource not found".into()),
            ResourceError::LanguageNotFound => AppError::BadRequest("Language not found".into()),
            ResourceError::NotOwner => AppError::Forbidden("Not the resource owner".into()),
            ResourceError::InvalidPayload(msg) => AppError::BadRequest(msg),
            ResourceError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[async_trait]
pub trait ResourceService: Send + Sync {
    async fn create(
        &self,
        owner_id: i64,
        input: CreateResourceDto,
    ) -> Result<Resource, ResourceError>;

    async fn get(&self, resource_id: i64) -> Result<Resource, ResourceError>;

    async fn update(
        &self,
        resource_id: i64,
        user_id: i64,
        update: UpdateResourceDto,
    ) -> Result<Resource, ResourceError>;

    async fn delete(&self, resource_id: i64, user_id: i64) -> Result<(), ResourceError>;

    async fn list(&self, filter: ResourceFilter) -> Result<Vec<Resource>, ResourceError>;

    /// Resources from users the given user follows, newest first.
    async fn feed(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Resource>, ResourceError>;

    /// Derived metadata for a file resource: uppercase extension, size
    /// in MiB, and display title (file name when no title was set).
    async fn file_metadata(&self, resource_id: i64) -> Result<FileMetadataDto, ResourceError>;

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<Resource>, ResourceError>;
}

pub struct ResourceServiceImpl<R, L>
where
    R: ResourceRepository,
    L: LanguageRepository,
{
    resource_repo: Arc<R>,
    language_repo: Arc<L>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<R, L> ResourceServiceImpl<R, L>
where
    R: ResourceRepository,
    L: LanguageRepository,
{
    pub fn new(
        resource_repo: Arc<R>,
        language_repo: Arc<L>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            resource_repo,
            language_repo,
            id_generator,
        }
    }

    fn validate_payload(input: &CreateResourceDto) -> Result<(), ResourceError> {
        match input.kind {
            ResourceKind::Link => {
                if input.url.as_deref().map_or(true, str::is_empty) {
                    return Err(ResourceError::InvalidPayload(
                        "Link resources require a url".into(),
                    ));
                }
            }
            ResourceKind::File => {
                if input.file_path.as_deref().map_or(true, str::is_empty)
                    || input.file_name.as_deref().map_or(true, str::is_empty)
                {
                    return Err(ResourceError::InvalidPayload(
                        "File resources require file_path and file_name".into(),
                    ));
                }
                if input.file_size_bytes.map_or(true, |s| s < 0) {
                    return Err(ResourceError::InvalidPayload(
                        "File resources require a non-negative file_size_bytes".into(),
                    ));
                }
            }
            ResourceKind::Photo => {
                if input.photo_url.as_deref().map_or(true, str::is_empty) {
                    return Err(ResourceError::InvalidPayload(
                        "Photo resources require a photo_url".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<R, L> ResourceService for ResourceServiceImpl<R, L>
where
    R: ResourceRepository + 'static,
    L: LanguageRepository + 'static,
{
    async fn create(
        &self,
        owner_id: i64,
        input: CreateResourceDto,
    ) -> Result<Resource, ResourceError> {
        Self::validate_payload(&input)?;

        self.language_repo
            .find_by_id(input.language_id)
            .await
            .map_err(|e| ResourceError::Internal(e.to_string()))?
            .ok_or(ResourceError::LanguageNotFound)?;

        let resource = NewResource {
            id: self.id_generator.generate(),
            owner_id,
            language_id: input.language_id,
            kind: input.kind,
            caption: input.caption,
            topic: input.topic,
            url: input.url,
            file_path: input.file_path,
            file_name: input.file_name,
            file_size_bytes: input.file_size_bytes,
            title: input.title,
            photo_url: input.photo_url,
        };

        self.resource_repo
            .create(&resource)
            .await
            .map_err(|e| ResourceError::Internal(e.to_string()))
    }

    async fn get(&self, resource_id: i64) -> Result<Resource, ResourceError> {
        self.resource_repo
            .find_by_id(resource_id)
            .await
            .map_err(|e| ResourceError::Internal(e.to_string()))?
            .ok_or(ResourceError::NotFound)
    }

    async fn update(
        &self,
        resource_id: i64,
        user_id: i64,
        update: UpdateResourceDto,
    ) -> Result<Resource, ResourceError> {
        let mut resource = self.get(resource_id).await?;

        if resource.owner_id != user_id {
            return Err(ResourceError::NotOwner);
        }

        if let Some(caption) = update.caption {
            resource.caption = caption;
        }
        if let Some(topic) = update.topic {
            resource.topic = topic;
        }
        if let Some(url) = update.url {
            resource.url = Some(url);
        }
        if let Some(title) = update.title {
            resource.title = Some(title);
        }
        resource.updated_at = Utc::now();

        self.resource_repo
            .update(&resource)
            .await
            .map_err(|e| ResourceError::Internal(e.to_string()))
    }

    async fn delete(&self, resource_id: i64, user_id: i64) -> Result<(), ResourceError> {
        let resource = self.get(resource_id).await?;

        if resource.owner_id != user_id {
            return Err(ResourceError::NotOwner);
        }

        self.resource_repo
            .delete(resource_id)
            .await
            .map_err(|e| ResourceError::Internal(e.to_string()))
    }

    async fn list(&self, filter: ResourceFilter) -> Result<Vec<Resource>, ResourceError> {
        self.resource_repo
            .list(&filter)
            .await
            .map_err(|e| ResourceError::Internal(e.to_string()))
    }

    async fn feed(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Resource>, ResourceError> {
        self.resource_repo
            .feed(user_id, limit, offset)
            .await
            .map_err(|e| ResourceError::Internal(e.to_string()))
    }

    async fn file_metadata(&self, resource_id: i64) -> Result<FileMetadataDto, ResourceError> {
        let resource = self.get(resource_id).await?;

        if resource.kind != ResourceKind::File {
            return Err(ResourceError::InvalidPayload(
                "Metadata is only available for file resources".into(),
            ));
        }

        let file_name = resource.file_name.unwrap_or_default();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_uppercase())
            .unwrap_or_default();

        let bytes = resource.file_size_bytes.unwrap_or(0) as f64;
        let size_mib = (bytes / (1024.0 * 1024.0) * 100.0).round() / 100.0;

        let title = resource
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or(file_name);

        Ok(FileMetadataDto {
            extension,
            size_mib,
            title,
        })
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<Resource>, ResourceError> {
        self.resource_repo
            .search(query, limit)
            .await
            .map_err(|e| ResourceError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::language::MockLanguageRepository;
    use crate::domain::entities::resource::MockResourceRepository;
    use crate::domain::Language;

    fn sample_input(kind: ResourceKind) -> CreateResourceDto {
        CreateResourceDto {
            kind,
            language_id: 1,
            caption: "A grammar guide".into(),
            topic: "grammar".into(),
            url: None,
            file_path: None,
            file_name: None,
            file_size_bytes: None,
            title: None,
            photo_url: None,
        }
    }

    fn file_resource(file_name: Option<&str>, size: i64, title: Option<&str>) -> Resource {
        let now = Utc::now();
        Resource {
            id: 1,
            owner_id: 10,
            language_id: 1,
            kind: ResourceKind::File,
            caption: "c".into(),
            topic: "t".into(),
            url: None,
            file_path: Some("uploads/doc.pdf".into()),
            file_name: file_name.map(String::from),
            file_size_bytes: Some(size),
            title: title.map(String::from),
            photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        resource_repo: MockResourceRepository,
        language_repo: MockLanguageRepository,
    ) -> ResourceServiceImpl<MockResourceRepository, MockLanguageRepository> {
        ResourceServiceImpl::new(
            Arc::new(resource_repo),
            Arc::new(language_repo),
            Arc::new(SnowflakeGenerator::new(1, 0)),
        )
    }

    #[tokio::test]
    async fn test_create_link_without_url_rejected() {
        let svc = service(MockResourceRepository::new(), MockLanguageRepository::new());

        let result = svc.create(10, sample_input(ResourceKind::Link)).await;
        assert!(matches!(result, Err(ResourceError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn test_create_with_unknown_language_rejected() {
        let mut language_repo = MockLanguageRepository::new();
        language_repo.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(MockResourceRepository::new(), language_repo);

        let mut input = sample_input(ResourceKind::Link);
        input.url = Some("https://example.com/guide".into());

        let result = svc.create(10, input).await;
        assert!(matches!(result, Err(ResourceError::LanguageNotFound)));
    }

    #[tokio::test]
    async fn test_create_link_succeeds() {
        let mut language_repo = MockLanguageRepository::new();
        language_repo.expect_find_by_id().returning(|id| {
            Ok(Some(Language {
                id,
                name: "English".into(),
                shorty: "en".into(),
                description: String::new(),
            }))
        });

        let mut resource_repo = MockResourceRepository::new();
        resource_repo.expect_create().returning(|r| {
            let now = Utc::now();
            Ok(Resource {
                id: r.id,
                owner_id: r.owner_id,
                language_id: r.language_id,
                kind: r.kind,
                caption: r.caption.clone(),
                topic: r.topic.clone(),
                url: r.url.clone(),
                file_path: r.file_path.clone(),
                file_name: r.file_name.clone(),
                file_size_bytes: r.file_size_bytes,
                title: r.title.clone(),
                photo_url: r.photo_url.clone(),
                created_at: now,
                updated_at: now,
            })
        });

        let svc = service(resource_repo, language_repo);

        let mut input = sample_input(ResourceKind::Link);
        input.url = Some("https://example.com/guide".into());

        let created = svc.create(10, input).await.unwrap();
        assert_eq!(created.owner_id, 10);
        assert_eq!(created.kind, ResourceKind::Link);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_forbidden() {
        let mut resource_repo = MockResourceRepository::new();
        resource_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(file_resource(Some("doc.pdf"), 1024, None))));

        let svc = service(resource_repo, MockLanguageRepository::new());

        let result = svc.update(1, 999, UpdateResourceDto::default()).await;
        assert!(matches!(result, Err(ResourceError::NotOwner)));
    }

    #[tokio::test]
    async fn test_file_metadata_derives_extension_and_size() {
        let mut resource_repo = MockResourceRepository::new();
        resource_repo.expect_find_by_id().returning(|_| {
            Ok(Some(file_resource(Some("notes.PdF"), 3 * 1024 * 1024, None)))
        });

        let svc = service(resource_repo, MockLanguageRepository::new());

        let meta = svc.file_metadata(1).await.unwrap();
        assert_eq!(meta.extension, "PDF");
        assert_eq!(meta.size_mib, 3.0);
        // Title falls back to the file name
        assert_eq!(meta.title, "notes.PdF");
    }

    #[tokio::test]
    async fn test_file_metadata_rounds_to_two_decimals() {
        let mut resource_repo = MockResourceRepository::new();
        resource_repo.expect_find_by_id().returning(|_| {
            Ok(Some(file_resource(
                Some("clip.mp4"),
                1_500_000,
                Some("Lesson clip"),
            )))
        });

        let svc = service(resource_repo, MockLanguageRepository::new());

        let meta = svc.file_metadata(1).await.unwrap();
        assert_eq!(meta.size_mib, 1.43);
        assert_eq!(meta.title, "Lesson clip");
    }

    #[tokio::test]
    async fn test_file_metadata_for_link_rejected() {
        let mut resource_repo = MockResourceRepository::new();
        resource_repo.expect_find_by_id().returning(|_| {
            let mut r = file_resource(None, 0, None);
            r.kind = ResourceKind::Link;
            r.url = Some("https://example.com".into());
            Ok(Some(r))
        });

        let svc = service(resource_repo, MockLanguageRepository::new());

        let result = svc.file_metadata(1).await;
        assert!(matches!(result, Err(ResourceError::InvalidPayload(_))));
    }
}
