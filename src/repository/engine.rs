//! Repository Engine
//!
//! Generic CRUD/query engine over an in-memory collection, parameterized
//! over where the collection is stored and how inputs are validated.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::RepositoryConfig;
use crate::error::{RepositoryError, Result};
use crate::repository::filter::matches_all;
use crate::repository::{
    CrudRepository, Entity, Filters, PageInfo, Paginated, Pagination, RepositoryResult, Store,
    Validator, SEARCH_FIELDS,
};

// == Repository ==
/// In-memory repository for one entity type.
///
/// The collection is loaded from the store on first use. A failed load is
/// logged and leaves the repository with an empty collection. The
/// collection lives behind one mutex that each operation holds from start
/// to finish, including the save, so mutations never interleave. Mutations
/// are applied to a copy which replaces the collection only after the store
/// accepted it.
pub struct Repository<E: Entity, S, V> {
    store: S,
    validator: V,
    config: RepositoryConfig,
    clock: Arc<dyn Clock>,
    /// `None` until loaded
    collection: Mutex<Option<Vec<E>>>,
}

impl<E, S, V> Repository<E, S, V>
where
    E: Entity,
    S: Store<E>,
    V: Validator<E>,
{
    // == Constructor ==
    /// Creates an unloaded repository using wall-clock time.
    pub fn new(store: S, validator: V, config: RepositoryConfig) -> Self {
        Self::with_clock(store, validator, config, Arc::new(SystemClock))
    }

    /// Creates an unloaded repository reading timestamps from `clock`.
    pub fn with_clock(
        store: S,
        validator: V,
        config: RepositoryConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        if config.enable_soft_delete {
            warn!(
                entity_type = E::ENTITY_TYPE,
                "soft delete is not supported yet, deletes stay permanent"
            );
        }

        Self {
            store,
            validator,
            config,
            clock,
            collection: Mutex::new(None),
        }
    }

    /// Whether the collection has been loaded.
    pub async fn is_loaded(&self) -> bool {
        self.collection.lock().await.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // == Loading ==
    /// Locks the collection, loading it first if needed.
    async fn loaded(&self) -> MappedMutexGuard<'_, Vec<E>> {
        let mut guard = self.collection.lock().await;

        if guard.is_none() {
            let items = match self.store.load().await {
                Ok(items) => {
                    debug!(
                        entity_type = E::ENTITY_TYPE,
                        count = items.len(),
                        "collection loaded"
                    );
                    items
                }
                Err(err) => {
                    warn!(
                        entity_type = E::ENTITY_TYPE,
                        error = %err,
                        "failed to load collection, continuing with empty data"
                    );
                    Vec::new()
                }
            };
            *guard = Some(items);
        }

        MutexGuard::map(guard, |state| state.get_or_insert_with(Vec::new))
    }

    /// Saves `next` and swaps it in. On failure the collection is untouched.
    async fn commit(&self, collection: &mut Vec<E>, next: Vec<E>) -> Result<()> {
        self.store.save(&next).await?;
        *collection = next;
        Ok(())
    }

    // == Helpers ==
    fn new_id(collection: &[E]) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !collection.iter().any(|e| e.id() == id) {
                return id;
            }
        }
    }

    /// Now, or one microsecond past `previous` if the clock has not moved.
    fn next_timestamp(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.now();
        if now > previous {
            now
        } else {
            previous + Duration::microseconds(1)
        }
    }

    fn check_create(&self, input: &E::Create) -> Result<()> {
        if !self.config.validate_on_create {
            return Ok(());
        }
        self.validator.validate_create(input).into_result()
    }

    fn check_update(&self, patch: &E::Update) -> Result<()> {
        if !self.config.validate_on_update {
            return Ok(());
        }
        self.validator.validate_update(patch).into_result()
    }

    /// Builds the entity for `input` and appends it to `items`.
    fn insert(&self, items: &mut Vec<E>, input: E::Create) -> E {
        let entity = E::from_input(Self::new_id(items), input, self.clock.now());
        items.push(entity.clone());
        entity
    }

    /// Merges `patch` into the entity with `id` inside `items`.
    fn modify(&self, items: &mut [E], id: &str, patch: E::Update) -> Result<E> {
        let entity = items
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        let previous = entity.updated_at();
        entity.apply_update(patch);
        entity.set_updated_at(self.next_timestamp(previous));
        Ok(entity.clone())
    }

    fn remove(items: &mut Vec<E>, id: &str) -> Result<E> {
        let index = items
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        Ok(items.remove(index))
    }

    fn page_of(items: Vec<E>, pagination: Option<&Pagination>) -> Result<Vec<E>> {
        match pagination {
            Some(p) => {
                p.validate()?;
                let mut items = items;
                p.sort(&mut items);
                Ok(p.slice(&items))
            }
            None => Ok(items),
        }
    }

    // == Operations ==
    async fn try_get_all(&self, pagination: Option<&Pagination>) -> Result<Vec<E>> {
        if let Some(p) = pagination {
            p.validate()?;
        }
        let items = self.loaded().await.clone();
        Self::page_of(items, pagination)
    }

    async fn try_get_paginated(&self, pagination: &Pagination) -> Result<Paginated<E>> {
        pagination.validate()?;
        let mut items = self.loaded().await.clone();
        pagination.sort(&mut items);

        Ok(Paginated {
            data: pagination.slice(&items),
            pagination: PageInfo::new(pagination.page, pagination.limit, items.len()),
        })
    }

    async fn try_get_by_id(&self, id: &str) -> Result<Option<E>> {
        let items = self.loaded().await;
        Ok(items.iter().find(|e| e.id() == id).cloned())
    }

    async fn try_get_by_ids(&self, ids: &[String]) -> Result<Vec<E>> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let items = self.loaded().await;
        Ok(items
            .iter()
            .filter(|e| wanted.contains(e.id()))
            .cloned()
            .collect())
    }

    async fn try_create(&self, input: E::Create) -> Result<E> {
        // Validation runs before the collection is touched
        self.check_create(&input)?;

        let mut items = self.loaded().await;
        let mut next = items.clone();
        let entity = self.insert(&mut next, input);
        self.commit(&mut items, next).await?;

        info!(entity_type = E::ENTITY_TYPE, id = entity.id(), "entity created");
        Ok(entity)
    }

    async fn try_create_many(&self, inputs: Vec<E::Create>) -> Result<Vec<E>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = self.loaded().await;
        let mut next = items.clone();
        let created = inputs
            .into_iter()
            .map(|input| {
                self.check_create(&input)?;
                Ok(self.insert(&mut next, input))
            })
            .collect::<Result<Vec<_>>>()?;
        self.commit(&mut items, next).await?;

        info!(entity_type = E::ENTITY_TYPE, count = created.len(), "entities created");
        Ok(created)
    }

    async fn try_update(&self, id: &str, patch: E::Update) -> Result<E> {
        self.check_update(&patch)?;

        let mut items = self.loaded().await;
        let mut next = items.clone();
        let updated = self.modify(&mut next, id, patch)?;
        self.commit(&mut items, next).await?;

        debug!(entity_type = E::ENTITY_TYPE, id, "entity updated");
        Ok(updated)
    }

    async fn try_update_many(&self, updates: Vec<(String, E::Update)>) -> Result<Vec<E>> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }

        let mut items = self.loaded().await;
        let mut next = items.clone();
        let updated = updates
            .into_iter()
            .map(|(id, patch)| {
                self.check_update(&patch)?;
                self.modify(&mut next, &id, patch)
            })
            .collect::<Result<Vec<_>>>()?;
        self.commit(&mut items, next).await?;

        debug!(entity_type = E::ENTITY_TYPE, count = updated.len(), "entities updated");
        Ok(updated)
    }

    async fn try_delete(&self, id: &str) -> Result<bool> {
        let mut items = self.loaded().await;
        let mut next = items.clone();
        Self::remove(&mut next, id)?;
        self.commit(&mut items, next).await?;

        info!(entity_type = E::ENTITY_TYPE, id, "entity deleted");
        Ok(true)
    }

    async fn try_delete_many(&self, ids: &[String]) -> Result<bool> {
        if ids.is_empty() {
            return Ok(true);
        }

        let mut items = self.loaded().await;
        let mut next = items.clone();
        for id in ids {
            Self::remove(&mut next, id)?;
        }
        self.commit(&mut items, next).await?;

        info!(entity_type = E::ENTITY_TYPE, count = ids.len(), "entities deleted");
        Ok(true)
    }

    async fn try_search(&self, query: &str, pagination: Option<&Pagination>) -> Result<Vec<E>> {
        if let Some(p) = pagination {
            p.validate()?;
        }
        let needle = query.to_lowercase();
        let items = self.loaded().await;

        let hits: Vec<E> = items
            .iter()
            .filter(|e| {
                SEARCH_FIELDS.iter().any(|name| {
                    e.value_of(name)
                        .as_ref()
                        .and_then(|v| v.as_text())
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
            })
            .cloned()
            .collect();

        // Relevance order is collection order; no sorting here
        Ok(match pagination {
            Some(p) => p.slice(&hits),
            None => hits,
        })
    }

    async fn try_filter(&self, filters: &Filters, pagination: Option<&Pagination>) -> Result<Vec<E>> {
        if let Some(p) = pagination {
            p.validate()?;
        }
        let matched: Vec<E> = {
            let items = self.loaded().await;
            items.iter().filter(|e| matches_all(*e, filters)).cloned().collect()
        };
        Self::page_of(matched, pagination)
    }

    async fn try_exists(&self, id: &str) -> Result<bool> {
        Ok(self.loaded().await.iter().any(|e| e.id() == id))
    }

    async fn try_count(&self, filters: Option<&Filters>) -> Result<usize> {
        let items = self.loaded().await;
        Ok(match filters {
            Some(filters) => items.iter().filter(|e| matches_all(*e, filters)).count(),
            None => items.len(),
        })
    }

    /// Wraps an outcome in the envelope, logging unexpected failures.
    fn finish<T>(&self, operation: &'static str, result: Result<T>) -> RepositoryResult<T> {
        if let Err(err) = &result {
            match err {
                RepositoryError::Unknown(_) => warn!(
                    entity_type = E::ENTITY_TYPE,
                    operation,
                    error = %err,
                    "repository operation failed"
                ),
                _ => debug!(
                    entity_type = E::ENTITY_TYPE,
                    operation,
                    code = %err.code(),
                    "repository operation rejected"
                ),
            }
        }
        RepositoryResult::from_result(result)
    }

    /// Like `finish`, but a `NOT_FOUND` still reports `data = false`.
    fn finish_delete(&self, operation: &'static str, result: Result<bool>) -> RepositoryResult<bool> {
        match result {
            Err(err @ RepositoryError::NotFound(_)) => {
                debug!(entity_type = E::ENTITY_TYPE, operation, error = %err, "nothing to delete");
                RepositoryResult::failure_with(false, err)
            }
            other => self.finish(operation, other),
        }
    }
}

#[async_trait]
impl<E, S, V> CrudRepository<E> for Repository<E, S, V>
where
    E: Entity,
    S: Store<E>,
    V: Validator<E>,
{
    fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    async fn get_all(&self, pagination: Option<&Pagination>) -> RepositoryResult<Vec<E>> {
        self.finish("get_all", self.try_get_all(pagination).await)
    }

    async fn get_paginated(&self, pagination: &Pagination) -> RepositoryResult<Paginated<E>> {
        self.finish("get_paginated", self.try_get_paginated(pagination).await)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<E>> {
        self.finish("get_by_id", self.try_get_by_id(id).await)
    }

    async fn get_by_ids(&self, ids: &[String]) -> RepositoryResult<Vec<E>> {
        self.finish("get_by_ids", self.try_get_by_ids(ids).await)
    }

    async fn create(&self, input: E::Create) -> RepositoryResult<E> {
        self.finish("create", self.try_create(input).await)
    }

    async fn create_many(&self, inputs: Vec<E::Create>) -> RepositoryResult<Vec<E>> {
        self.finish("create_many", self.try_create_many(inputs).await)
    }

    async fn update(&self, id: &str, patch: E::Update) -> RepositoryResult<E> {
        self.finish("update", self.try_update(id, patch).await)
    }

    async fn update_many(&self, updates: Vec<(String, E::Update)>) -> RepositoryResult<Vec<E>> {
        self.finish("update_many", self.try_update_many(updates).await)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        self.finish_delete("delete", self.try_delete(id).await)
    }

    async fn delete_many(&self, ids: &[String]) -> RepositoryResult<bool> {
        self.finish_delete("delete_many", self.try_delete_many(ids).await)
    }

    async fn search(
        &self,
        query: &str,
        pagination: Option<&Pagination>,
    ) -> RepositoryResult<Vec<E>> {
        self.finish("search", self.try_search(query, pagination).await)
    }

    async fn filter(
        &self,
        filters: &Filters,
        pagination: Option<&Pagination>,
    ) -> RepositoryResult<Vec<E>> {
        self.finish("filter", self.try_filter(filters, pagination).await)
    }

    async fn exists(&self, id: &str) -> RepositoryResult<bool> {
        self.finish("exists", self.try_exists(id).await)
    }

    async fn count(&self, filters: Option<&Filters>) -> RepositoryResult<usize> {
        self.finish("count", self.try_count(filters).await)
    }
}
