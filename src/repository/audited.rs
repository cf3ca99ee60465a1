//! Auditing decorator.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::RepositoryConfig;
use crate::repository::{
    AuditAction, AuditEvent, AuditSink, CrudRepository, Entity, Filters, Paginated, Pagination,
    RepositoryResult,
};

/// Records an [`AuditEvent`] for every successful single-entity read and
/// every successful write of the wrapped repository.
///
/// Writes go through a gate so the `before` snapshot taken for an update
/// or delete is the state the write actually replaced.
pub struct AuditedRepository<E: Entity, R> {
    inner: R,
    sink: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    write_gate: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

impl<E: Entity, R: CrudRepository<E>> AuditedRepository<E, R> {
    pub fn new(inner: R, sink: Arc<dyn AuditSink>) -> Self {
        Self::with_clock(inner, sink, Arc::new(SystemClock))
    }

    pub fn with_clock(inner: R, sink: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            sink,
            clock,
            write_gate: Mutex::new(()),
            _entity: PhantomData,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn record(&self, action: AuditAction, id: &str, before: Option<Value>, after: Option<Value>) {
        self.sink.record(AuditEvent {
            action,
            entity_type: E::ENTITY_TYPE.to_string(),
            entity_id: id.to_string(),
            before,
            after,
            timestamp: self.clock.now(),
        });
    }

    /// Current snapshots of `ids`, keyed by id.
    async fn snapshots(&self, ids: &[String]) -> HashMap<String, Value> {
        self.inner
            .get_by_ids(ids)
            .await
            .data
            .unwrap_or_default()
            .iter()
            .filter_map(|e| Some((e.id().to_string(), snapshot(e)?)))
            .collect()
    }
}

#[async_trait]
impl<E, R> CrudRepository<E> for AuditedRepository<E, R>
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
        let result = self.inner.get_by_id(id).await;
        if let Some(Some(entity)) = &result.data {
            self.record(AuditAction::Read, id, None, snapshot(entity));
        }
        result
    }

    async fn get_by_ids(&self, ids: &[String]) -> RepositoryResult<Vec<E>> {
        self.inner.get_by_ids(ids).await
    }

    async fn create(&self, input: E::Create) -> RepositoryResult<E> {
        let _gate = self.write_gate.lock().await;
        let result = self.inner.create(input).await;
        if let Some(entity) = &result.data {
            self.record(AuditAction::Create, entity.id(), None, snapshot(entity));
        }
        result
    }

    async fn create_many(&self, inputs: Vec<E::Create>) -> RepositoryResult<Vec<E>> {
        let _gate = self.write_gate.lock().await;
        let result = self.inner.create_many(inputs).await;
        for entity in result.data.iter().flatten() {
            self.record(AuditAction::Create, entity.id(), None, snapshot(entity));
        }
        result
    }

    async fn update(&self, id: &str, patch: E::Update) -> RepositoryResult<E> {
        let _gate = self.write_gate.lock().await;
        let before = self.snapshots(&[id.to_string()]).await.remove(id);
        let result = self.inner.update(id, patch).await;
        if let Some(entity) = &result.data {
            self.record(AuditAction::Update, id, before, snapshot(entity));
        }
        result
    }

    async fn update_many(&self, updates: Vec<(String, E::Update)>) -> RepositoryResult<Vec<E>> {
        let _gate = self.write_gate.lock().await;
        let ids: Vec<String> = updates.iter().map(|(id, _)| id.clone()).collect();
        let mut before = self.snapshots(&ids).await;
        let result = self.inner.update_many(updates).await;
        for entity in result.data.iter().flatten() {
            // A repeated id chains: its next `before` is this `after`
            let after = snapshot(entity);
            let previous = match &after {
                Some(value) => before.insert(entity.id().to_string(), value.clone()),
                None => before.remove(entity.id()),
            };
            self.record(AuditAction::Update, entity.id(), previous, after);
        }
        result
    }

    async fn delete(&self, id: &str) -> RepositoryResult<bool> {
        let _gate = self.write_gate.lock().await;
        let before = self.snapshots(&[id.to_string()]).await.remove(id);
        let result = self.inner.delete(id).await;
        if result.data == Some(true) {
            self.record(AuditAction::Delete, id, before, None);
        }
        result
    }

    async fn delete_many(&self, ids: &[String]) -> RepositoryResult<bool> {
        let _gate = self.write_gate.lock().await;
        let mut before = self.snapshots(ids).await;
        let result = self.inner.delete_many(ids).await;
        if result.data == Some(true) {
            for id in ids {
                if let Some(snapshot) = before.remove(id) {
                    self.record(AuditAction::Delete, id, Some(snapshot), None);
                }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::repository::test_support::{new_note, note, seeded, Note, NotePatch};
    use crate::repository::MemoryAuditSink;

    fn audited(sink: Arc<MemoryAuditSink>) -> AuditedRepository<Note, impl CrudRepository<Note>> {
        AuditedRepository::with_clock(
            seeded(vec![note("1", "Alpha"), note("2", "Beta")]),
            sink,
            Arc::new(ManualClock::default()),
        )
    }

    fn retitle(title: &str) -> NotePatch {
        NotePatch {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_read_is_recorded_on_hit_only() {
        let sink = Arc::new(MemoryAuditSink::new());
        let repo = audited(sink.clone());

        repo.get_by_id("1").await;
        repo.get_by_id("404").await;
        repo.get_all(None).await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::Read);
        assert_eq!(events[0].entity_type, "note");
        assert_eq!(events[0].entity_id, "1");
    }

    #[tokio::test]
    async fn test_create_update_delete_events() {
        let sink = Arc::new(MemoryAuditSink::new());
        let repo = audited(sink.clone());

        let created = repo.create(new_note("Gamma")).await.data.unwrap();
        repo.update(&created.id, retitle("Gamma v2")).await;
        repo.delete(&created.id).await;

        let events = sink.events();
        assert_eq!(
            sink.actions(),
            vec![AuditAction::Create, AuditAction::Update, AuditAction::Delete]
        );

        assert!(events[0].before.is_none());
        assert_eq!(events[0].after.as_ref().unwrap()["title"], "Gamma");

        assert_eq!(events[1].before.as_ref().unwrap()["title"], "Gamma");
        assert_eq!(events[1].after.as_ref().unwrap()["title"], "Gamma v2");

        assert_eq!(events[2].before.as_ref().unwrap()["title"], "Gamma v2");
        assert!(events[2].after.is_none());
        assert!(events.iter().all(|e| e.entity_id == created.id));
    }

    #[tokio::test]
    async fn test_failures_are_not_recorded() {
        let sink = Arc::new(MemoryAuditSink::new());
        let repo = audited(sink.clone());

        repo.create(new_note("")).await;
        repo.update("404", retitle("x")).await;
        repo.delete("404").await;
        repo.delete_many(&["1".to_string(), "404".to_string()]).await;

        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_batches_record_one_event_per_item() {
        let sink = Arc::new(MemoryAuditSink::new());
        let repo = audited(sink.clone());

        repo.create_many(vec![new_note("Gamma"), new_note("Delta")])
            .await;
        repo.update_many(vec![
            ("1".to_string(), retitle("Alpha v2")),
            ("1".to_string(), retitle("Alpha v3")),
        ])
        .await;
        repo.delete_many(&["1".to_string(), "2".to_string()]).await;

        let events = sink.events();
        assert_eq!(
            sink.actions(),
            vec![
                AuditAction::Create,
                AuditAction::Create,
                AuditAction::Update,
                AuditAction::Update,
                AuditAction::Delete,
                AuditAction::Delete,
            ]
        );

        assert_eq!(events[2].before.as_ref().unwrap()["title"], "Alpha");
        assert_eq!(events[3].before.as_ref().unwrap()["title"], "Alpha v2");
        assert_eq!(events[4].before.as_ref().unwrap()["title"], "Alpha v3");
        assert_eq!(events[5].entity_id, "2");
    }
}
