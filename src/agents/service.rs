//! Agent Info Service
//!
//! Cache-aside lookups of agent and user metadata.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::agents::{AgentDirectory, AgentInfo, AgentKind};
use crate::cache::{CacheStats, SharedLruCache};
use crate::error::{AppError, Result};

/// Statistics for both metadata caches.
#[derive(Debug, Clone, Serialize)]
pub struct AgentCacheStats {
    pub agents: CacheStats,
    pub users: CacheStats,
}

// == Agent Info Service ==
/// Memoizes directory lookups in one LRU cache per [`AgentKind`].
///
/// Agents and users live in separate caches so an agent id never shadows a
/// user id with the same value.
#[derive(Clone)]
pub struct AgentInfoService {
    directory: Arc<dyn AgentDirectory>,
    agents: SharedLruCache<String, AgentInfo>,
    users: SharedLruCache<String, AgentInfo>,
}

impl AgentInfoService {
    // == Constructor ==
    pub fn new(
        directory: Arc<dyn AgentDirectory>,
        agent_capacity: usize,
        user_capacity: usize,
    ) -> Result<Self> {
        Ok(Self {
            directory,
            agents: SharedLruCache::new(agent_capacity)?,
            users: SharedLruCache::new(user_capacity)?,
        })
    }

    fn cache(&self, kind: AgentKind) -> &SharedLruCache<String, AgentInfo> {
        match kind {
            AgentKind::Agent => &self.agents,
            AgentKind::User => &self.users,
        }
    }

    // == Get Info ==
    /// Returns metadata for `id`, consulting the cache before the directory.
    ///
    /// Only found records are cached; an unknown id is re-queried next time.
    pub async fn get_info(&self, kind: AgentKind, id: &str) -> Result<AgentInfo> {
        let cache = self.cache(kind);
        if let Some(info) = cache.get(id).await {
            debug!("{} {} served from cache", kind, id);
            return Ok(info);
        }

        let info = self
            .directory
            .fetch(kind, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", kind, id)))?;

        if let Some((evicted, _)) = cache.put(id.to_string(), info.clone()).await {
            debug!("{} {} evicted from cache", kind, evicted);
        }
        Ok(info)
    }

    // == Update User Summary ==
    /// Refreshes the cached summary of a user, keeping the username.
    ///
    /// Users not currently cached are left alone; the next lookup reads the
    /// directory. Returns whether a cached entry was refreshed.
    pub async fn update_user_summary(&self, id: &str, summary: impl Into<String>) -> bool {
        let summary = summary.into();
        let refreshed = self
            .users
            .update(id, |current| AgentInfo::new(current.username.clone(), summary))
            .await;

        if refreshed {
            info!("Refreshed cached summary for user {}", id);
        }
        refreshed
    }

    // == Invalidate ==
    /// Drops the cached entry for `id`. Returns whether one was present.
    pub async fn invalidate(&self, kind: AgentKind, id: &str) -> bool {
        self.cache(kind).remove(id).await.is_some()
    }

    // == Stats ==
    pub async fn stats(&self) -> AgentCacheStats {
        AgentCacheStats {
            agents: self.agents.stats().await,
            users: self.users.stats().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::InMemoryDirectory;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory wrapper that counts fetches.
    struct CountingDirectory {
        inner: InMemoryDirectory,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl AgentDirectory for CountingDirectory {
        async fn fetch(&self, kind: AgentKind, id: &str) -> Result<Option<AgentInfo>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(kind, id).await
        }
    }

    async fn setup(capacity: usize) -> (Arc<CountingDirectory>, AgentInfoService) {
        let inner = InMemoryDirectory::new();
        inner
            .upsert(AgentKind::Agent, "a1", AgentInfo::new("ava", "explorer"))
            .await;
        inner
            .upsert(AgentKind::Agent, "a2", AgentInfo::new("bex", "trader"))
            .await;
        inner
            .upsert(AgentKind::User, "a1", AgentInfo::new("sam", "player"))
            .await;

        let directory = Arc::new(CountingDirectory {
            inner,
            fetches: AtomicUsize::new(0),
        });
        let service = AgentInfoService::new(directory.clone(), capacity, capacity).unwrap();
        (directory, service)
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let (directory, service) = setup(4).await;

        let first = service.get_info(AgentKind::Agent, "a1").await.unwrap();
        let second = service.get_info(AgentKind::Agent, "a1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(directory.fetches.load(Ordering::SeqCst), 1);

        let stats = service.stats().await;
        assert_eq!(stats.agents.hits, 1);
        assert_eq!(stats.agents.misses, 1);
    }

    #[tokio::test]
    async fn test_agents_and_users_do_not_collide() {
        let (_, service) = setup(4).await;

        let agent = service.get_info(AgentKind::Agent, "a1").await.unwrap();
        let user = service.get_info(AgentKind::User, "a1").await.unwrap();

        assert_eq!(agent.username, "ava");
        assert_eq!(user.username, "sam");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_cached() {
        let (directory, service) = setup(4).await;

        for _ in 0..2 {
            let result = service.get_info(AgentKind::Agent, "ghost").await;
            assert!(matches!(result, Err(AppError::NotFound(_))));
        }

        assert_eq!(directory.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(service.stats().await.agents.total_entries, 0);
    }

    #[tokio::test]
    async fn test_eviction_forces_refetch() {
        let (directory, service) = setup(1).await;

        service.get_info(AgentKind::Agent, "a1").await.unwrap();
        service.get_info(AgentKind::Agent, "a2").await.unwrap();
        service.get_info(AgentKind::Agent, "a1").await.unwrap();

        assert_eq!(directory.fetches.load(Ordering::SeqCst), 3);
        assert_eq!(service.stats().await.agents.evictions, 2);
    }

    #[tokio::test]
    async fn test_update_user_summary_refreshes_cached_entry() {
        let (directory, service) = setup(4).await;
        service.get_info(AgentKind::User, "a1").await.unwrap();

        assert!(service.update_user_summary("a1", "veteran").await);

        let user = service.get_info(AgentKind::User, "a1").await.unwrap();
        assert_eq!(user, AgentInfo::new("sam", "veteran"));
        assert_eq!(directory.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_user_summary_ignores_uncached_user() {
        let (_, service) = setup(4).await;

        assert!(!service.update_user_summary("a1", "veteran").await);

        let user = service.get_info(AgentKind::User, "a1").await.unwrap();
        assert_eq!(user.summary, "player");
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (directory, service) = setup(4).await;
        service.get_info(AgentKind::Agent, "a1").await.unwrap();

        assert!(service.invalidate(AgentKind::Agent, "a1").await);
        assert!(!service.invalidate(AgentKind::Agent, "a1").await);

        service.get_info(AgentKind::Agent, "a1").await.unwrap();
        assert_eq!(directory.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let directory: Arc<dyn AgentDirectory> = Arc::new(InMemoryDirectory::new());
        let result = AgentInfoService::new(directory, 0, 16);
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }
}
