//! The repository contract shared by the engine and its decorators.

use async_trait::async_trait;

use crate::config::RepositoryConfig;
use crate::repository::{Entity, Filters, Paginated, Pagination, RepositoryResult};

/// CRUD and query operations over one entity collection.
///
/// Every operation returns a [`RepositoryResult`]; expected failures
/// (`VALIDATION_ERROR`, `NOT_FOUND`) and unexpected ones (`UNKNOWN_ERROR`)
/// are reported in the envelope, never by panicking.
///
/// # Implementations
///
/// - [`crate::repository::Repository`] - the in-memory engine
/// - [`crate::repository::CachedRepository`] - TTL cache in front of another repository
/// - [`crate::repository::AuditedRepository`] - audit events around another repository
#[async_trait]
pub trait CrudRepository<E: Entity>: Send + Sync {
    /// Name of the managed entity type.
    fn entity_type(&self) -> &'static str {
        E::ENTITY_TYPE
    }

    fn config(&self) -> &RepositoryConfig;

    /// All entities, optionally sorted and sliced to one page.
    async fn get_all(&self, pagination: Option<&Pagination>) -> RepositoryResult<Vec<E>>;

    /// One page plus totals.
    async fn get_paginated(&self, pagination: &Pagination) -> RepositoryResult<Paginated<E>>;

    /// `Some(entity)` or `None`; absence is not an error.
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<E>>;

    /// Entities whose id is in `ids`, in collection order.
    async fn get_by_ids(&self, ids: &[String]) -> RepositoryResult<Vec<E>>;

    async fn create(&self, input: E::Create) -> RepositoryResult<E>;

    /// Creates every input or none of them.
    async fn create_many(&self, inputs: Vec<E::Create>) -> RepositoryResult<Vec<E>>;

    async fn update(&self, id: &str, patch: E::Update) -> RepositoryResult<E>;

    /// Applies every `(id, patch)` pair or none of them.
    async fn update_many(&self, updates: Vec<(String, E::Update)>) -> RepositoryResult<Vec<E>>;

    /// `true` when removed; `NOT_FOUND` with `data = false` when absent.
    async fn delete(&self, id: &str) -> RepositoryResult<bool>;

    /// Removes every id or none of them.
    async fn delete_many(&self, ids: &[String]) -> RepositoryResult<bool>;

    /// Case-insensitive substring search over the entity's text fields.
    async fn search(&self, query: &str, pagination: Option<&Pagination>)
        -> RepositoryResult<Vec<E>>;

    /// Entities matching every filter entry.
    async fn filter(
        &self,
        filters: &Filters,
        pagination: Option<&Pagination>,
    ) -> RepositoryResult<Vec<E>>;

    async fn exists(&self, id: &str) -> RepositoryResult<bool>;

    /// Size of the filtered collection, or of the whole one.
    async fn count(&self, filters: Option<&Filters>) -> RepositoryResult<usize>;
}
