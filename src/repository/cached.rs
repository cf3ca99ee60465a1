//! Caching decorator.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{entity_key, CacheStats, TtlCache};
use crate::clock::{Clock, SystemClock};
use crate::config::RepositoryConfig;
use crate::repository::{
    CrudRepository, Entity, Filters, Paginated, Pagination, RepositoryResult,
};

// == Cached Repository ==
/// Puts a TTL cache in front of another repository.
///
/// `get_by_id` is served from the cache when possible. Successful creates
/// and updates write the entity through under `entity:<id>`; successful
/// deletes evict it. Every path that touches the cache holds the cache lock
/// across the inner call, so a slow read cannot put back a value a
/// concurrent write has already replaced.
pub struct CachedRepository<E: Entity, R> {
    inner: R,
    cache: Mutex<TtlCache<E>>,
    ttl: u64,
}

impl<E: Entity, R: CrudRepository<E>> CachedRepository<E, R> {
    pub fn new(inner: R, ttl: u64) -> Self {
        Self::with_clock(inner, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(inner: R, ttl: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: Mutex::new(TtlCache::with_clock(ttl, clock)),
            ttl,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    /// Drops every cached entity.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Whether a live entry exists for `id`.
    pub async fn is_cached(&self, id: &str) -> bool {
        self.cache.lock().await.has(&entity_key(id))
    }

    fn store_all(&self, cache: &mut TtlCache<E>, entities: &[E]) {
        for entity in entities {
            cache.set(entity_key(entity.id()), entity.clone(), Some(self.ttl));
        }
    }
}

#[async_trait]
impl<E, R> CrudRepository<E> for CachedRepository<E, R>
where
    E: Entity,
    R: CrudRepository<E>,
{
    fn config(&self) -> &RepositoryConfig {
        self.inner.config()
    }

    async fn get_all(&self, pagination: Option<&Pagination>) -> RepositoryResult<Vec<E>> {
        self.inner.get_all(pagination).await
    }

    async fn get_paginated(&self, pagination: &Pagination) -> RepositoryResult<Paginated<E>> {
        self.inner.get_paginated(pagination).await
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<E>> {
        let key = entity_key(id);
        let mut cache = self.cache.lock().await;

        if let Some(entity) = cache.get(&key) {
            debug!(entity_type = E::ENTITY_TYPE, id, "cache hit");
            return RepositoryResult::success(Some(entity));
        }

        let result = self.inner.get_by_id(id).await;
        if let Some(Some(entity)) = &result.data {
            cache.set(key, entity.clone(), Some(self.ttl));
        }
        result
    }

    async fn get_by_ids(&self, ids: &[String]) -> RepositoryResult<Vec<E>> {
        self.inner.get_by_ids(ids).await
    }

    async fn create(&self, input: E::Create) -> RepositoryResult<E> {
        let mut cache = self.cache.lock().await;
        let result = self.inner.create(input).await;
        if let Some(entity) = &result.data {
            self.store_all(&mut cache, std::slice::from_ref(entity));
        }
        result
    }

    async fn create_many(&self, inputs: Vec<E::Create>) -> RepositoryResult<Vec<E>> {
        let mut cache = self.cache.lock().await;
        let result = self.inner.create_many(inputs).await;
        if let Some(entities) = &result.data {
            self.store_all(&mut cache, entities);
        }
        result
    }

    async fn update(&self, id: &str, patch: E::Update) -> RepositoryResult<E> {
        let mut cache = self.cache.lock().await;
        let result = self.inner.update(id, patch).await;
        if let Some(entity) = &result.data {
            self.store_all(&mut cache, std::slice::from_ref(entity));
        }
        result
    }

    async fn update_many(&self, updates: Vec<(String, E::Update)>) -> RepositoryResult<Vec<E>> {
        let mut cache = self.cache.lock().await;
        let result = self.inner.update_many(updates).await;
        if let Some(entities) = &result.data {
            // A batch may touch one id twice; the last write wins
            self.store_all(&mut cache, entities);
        }
        result
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let mut cache = self.cache.lock().await;
        let result = self.inner.delete(id).await;
        if result.data == Some(true) {
            cache.delete(&entity_key(id));
        }
        result
    }

    async fn delete_many(&self, ids: &[String]) -> RepositoryResult<bool> {
        let mut cache = self.cache.lock().await;
        let result = self.inner.delete_many(ids).await;
        if result.data == Some(true) {
            for id in ids {
                cache.delete(&entity_key(id));
            }
        }
        result
    }

    async fn search(
        &self,
        query: &str,
        pagination: Option<&Pagination>,
    ) -> RepositoryResult<Vec<E>> {
        self.inner.search(query, pagination).await
    }

    async fn filter(
        &self,
        filters: &Filters,
        pagination: Option<&Pagination>,
    ) -> RepositoryResult<Vec<E>> {
        self.inner.filter(filters, pagination).await
    }

    async fn exists(&self, id: &str) -> RepositoryResult<bool> {
        self.inner.exists(id).await
    }

    async fn count(&self, filters: Option<&Filters>) -> RepositoryResult<usize> {
        self.inner.count(filters).await
    }
}
