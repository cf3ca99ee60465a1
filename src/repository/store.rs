//! Backing store seam for repositories.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::repository::Entity;

// == Store Trait ==
/// Where a repository's collection comes from and goes back to.
///
/// The engine calls `load` once, on first use, and `save` with the full
/// collection after every successful mutation. A file or database backed
/// implementation plugs in here without changing callers.
#[async_trait]
pub trait Store<E: Entity>: Send + Sync {
    async fn load(&self) -> Result<Vec<E>, StoreError>;

    async fn save(&self, items: &[E]) -> Result<(), StoreError>;
}

// == Memory Store ==
/// Stub store: loads a seed collection and keeps the last saved snapshot.
#[derive(Debug)]
pub struct MemoryStore<E> {
    seed: Vec<E>,
    saved: Mutex<Option<Vec<E>>>,
    saves: AtomicUsize,
}

impl<E: Entity> MemoryStore<E> {
    pub fn new(seed: Vec<E>) -> Self {
        Self {
            seed,
            saved: Mutex::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Last saved collection, if anything was saved yet.
    pub async fn snapshot(&self) -> Option<Vec<E>> {
        self.saved.lock().await.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl<E: Entity> Store<E> for MemoryStore<E> {
    async fn load(&self) -> Result<Vec<E>, StoreError> {
        let saved = self.saved.lock().await;
        Ok(saved.clone().unwrap_or_else(|| self.seed.clone()))
    }

    async fn save(&self, items: &[E]) -> Result<(), StoreError> {
        *self.saved.lock().await = Some(items.to_vec());
        let count = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            entity_type = E::ENTITY_TYPE,
            items = items.len(),
            saves = count,
            "collection saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{note, Note};

    #[tokio::test]
    async fn test_load_returns_seed_until_saved() {
        let store = MemoryStore::new(vec![note("1", "Alpha")]);

        assert_eq!(store.load().await.unwrap().len(), 1);
        assert!(store.snapshot().await.is_none());

        store.save(&[]).await.unwrap();

        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.snapshot().await, Some(Vec::<Note>::new()));
    }
}
