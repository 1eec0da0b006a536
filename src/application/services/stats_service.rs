//! Stats Service
//!
//! Portal-wide aggregate counts served read-through from Redis, and
//! per-user statistics computed on demand.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::StatsSettings;
use crate::infrastructure::cache::{Cache, STATS_CACHE_KEY};
use crate::infrastructure::repositories::{
    LanguageCount, PortalTotals, StatsRepository, TopResource, UserStats,
};
use crate::shared::error::AppError;

/// The cached /stats payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalStatsDto {
    pub totals: PortalTotals,
    pub resources_per_language: Vec<LanguageCount>,
    pub top_resources: Vec<TopResource>,
}

#[async_trait]
pub trait StatsService: Send + Sync {
    /// Portal-wide statistics, cached with a short TTL.
    async fn portal_stats(&self) -> Result<PortalStatsDto, AppError>;

    /// Per-user counters, never cached.
    async fn user_stats(&self, user_id: i64) -> Result<UserStats, AppError>;
}

pub struct StatsServiceImpl<S: StatsRepository, C: Cache> {
    stats_repo: Arc<S>,
    cache: C,
    settings: StatsSettings,
}

impl<S: StatsRepository, C: Cache> StatsServiceImpl<S, C> {
    pub fn new(stats_repo: Arc<S>, cache: C, settings: StatsSettings) -> Self {
        Self {
            stats_repo,
            cache,
            settings,
        }
    }

    async fn compute(&self) -> Result<PortalStatsDto, AppError> {
        let totals = self.stats_repo.totals().await?;
        let resources_per_language = self.stats_repo.resources_per_language().await?;
        let top_resources = self
            .stats_repo
            .top_resources_by_likes(self.settings.top_resources_limit)
            .await?;

        Ok(PortalStatsDto {
            totals,
            resources_per_language,
            top_resources,
        })
    }
}

#[async_trait]
impl<S: StatsRepository + 'static, C: Cache + 'static> StatsService for StatsServiceImpl<S, C> {
    async fn portal_stats(&self) -> Result<PortalStatsDto, AppError> {
        // Cache errors degrade to a direct computation, never to a 500.
        // An undeserializable entry counts as a miss so a stale schema
        // never wedges the endpoint.
        match self.cache.get(STATS_CACHE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<PortalStatsDto>(&raw) {
                Ok(cached) => return Ok(cached),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding undeserializable stats cache entry");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Stats cache read failed, computing directly");
            }
        }

        let stats = self.compute().await?;

        match serde_json::to_string(&stats) {
            Ok(json) => {
                if let Err(e) = self
                    .cache
                    .set(STATS_CACHE_KEY, json, self.settings.cache_ttl_secs)
                    .await
                {
                    tracing::warn!(error = %e, "Stats cache write failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stats cache serialization failed");
            }
        }

        Ok(stats)
    }

    async fn user_stats(&self, user_id: i64) -> Result<UserStats, AppError> {
        if !self.stats_repo.user_exists(user_id).await? {
            return Err(AppError::NotFound("User not found".into()));
        }

        self.stats_repo.user_stats(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mockall::predicate::eq;

    use crate::infrastructure::cache::MockCache;
    use crate::infrastructure::repositories::stats_repository::MockStatsRepository;

    fn settings() -> StatsSettings {
        StatsSettings {
            cache_ttl_secs: 300,
            top_resources_limit: 5,
        }
    }

    fn sample_stats() -> PortalStatsDto {
        PortalStatsDto {
            totals: PortalTotals {
                users: 12,
                resources: 34,
                likes: 56,
                comments: 7,
                follows: 8,
            },
            resources_per_language: vec![LanguageCount {
                language_id: 1,
                language_name: "English".into(),
                resource_count: 34,
            }],
            top_resources: vec![TopResource {
                resource_id: 99,
                caption: "Ownership explained".into(),
                owner_id: 3,
                like_count: 56,
            }],
        }
    }

    fn expect_compute(repo: &mut MockStatsRepository) {
        let stats = sample_stats();
        let totals = stats.totals.clone();
        let per_language = stats.resources_per_language.clone();
        let top = stats.top_resources.clone();

        repo.expect_totals().returning(move || Ok(totals.clone()));
        repo.expect_resources_per_language()
            .returning(move || Ok(per_language.clone()));
        repo.expect_top_resources_by_likes()
            .with(eq(5))
            .returning(move |_| Ok(top.clone()));
    }

    #[tokio::test]
    async fn test_portal_stats_cache_hit_skips_repository() {
        let mut cache = MockCache::new();
        let cached = serde_json::to_string(&sample_stats()).unwrap();
        cache
            .expect_get()
            .with(eq(STATS_CACHE_KEY))
            .returning(move |_| Ok(Some(cached.clone())));

        // No repository expectations set, any query would panic
        let svc = StatsServiceImpl::new(Arc::new(MockStatsRepository::new()), cache, settings());

        let stats = svc.portal_stats().await.unwrap();
        assert_eq!(stats.totals.users, 12);
        assert_eq!(stats.top_resources[0].like_count, 56);
    }

    #[tokio::test]
    async fn test_portal_stats_cache_miss_computes_and_stores() {
        let mut cache = MockCache::new();
        cache.expect_get().returning(|_| Ok(None));
        cache
            .expect_set()
            .withf(|key, json, ttl| {
                key == STATS_CACHE_KEY && json.contains("\"users\":12") && *ttl == 300
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut repo = MockStatsRepository::new();
        expect_compute(&mut repo);

        let svc = StatsServiceImpl::new(Arc::new(repo), cache, settings());

        let stats = svc.portal_stats().await.unwrap();
        assert_eq!(stats.totals.resources, 34);
        assert_eq!(stats.resources_per_language.len(), 1);
    }

    #[tokio::test]
    async fn test_portal_stats_survives_cache_outage() {
        let mut cache = MockCache::new();
        cache
            .expect_get()
            .returning(|_| Err(AppError::Internal("redis down".into())));
        cache
            .expect_set()
            .returning(|_, _, _| Err(AppError::Internal("redis down".into())));

        let mut repo = MockStatsRepository::new();
        expect_compute(&mut repo);

        let svc = StatsServiceImpl::new(Arc::new(repo), cache, settings());

        let stats = svc.portal_stats().await.unwrap();
        assert_eq!(stats.totals.likes, 56);
    }

    #[tokio::test]
    async fn test_portal_stats_treats_corrupt_cache_entry_as_miss() {
        let mut cache = MockCache::new();
        cache
            .expect_get()
            .returning(|_| Ok(Some("{not json".into())));
        cache.expect_set().times(1).returning(|_, _, _| Ok(()));

        let mut repo = MockStatsRepository::new();
        expect_compute(&mut repo);

        let svc = StatsServiceImpl::new(Arc::new(repo), cache, settings());

        let stats = svc.portal_stats().await.unwrap();
        assert_eq!(stats.totals.comments, 7);
    }

    #[tokio::test]
    async fn test_user_stats_for_unknown_user_is_not_found() {
        let mut repo = MockStatsRepository::new();
        repo.expect_user_exists()
            .with(eq(404_i64))
            .returning(|_| Ok(false));
        repo.expect_user_stats().never();

        let svc = StatsServiceImpl::new(Arc::new(repo), MockCache::new(), settings());

        let result = svc.user_stats(404).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_user_stats_passes_counters_through() {
        let mut repo = MockStatsRepository::new();
        repo.expect_user_exists().returning(|_| Ok(true));
        repo.expect_user_stats().with(eq(7_i64)).returning(|_| {
            Ok(UserStats {
                resources_shared: 4,
                likes_received: 9,
                comments_received: 2,
                followers: 3,
                following: 1,
            })
        });

        let svc = StatsServiceImpl::new(Arc::new(repo), MockCache::new(), settings());

        let stats = svc.user_stats(7).await.unwrap();
        assert_eq!(stats.resources_shared, 4);
        assert_eq!(stats.followers, 3);
    }
}
