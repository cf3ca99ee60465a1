//! Repository Registry
//!
//! Hands out configured repositories by entity type name. Repositories are
//! built once per `(entity type, config)` and shared afterwards.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::RepositoryConfig;
use crate::error::{RegistryError, Result, StoreError};
use crate::models::{
    about, contact, project, technology, AboutContent, AboutContentValidator, ContactInfo,
    ContactInfoValidator, Project, ProjectValidator, Technology, TechnologyValidator,
};
use crate::repository::{
    AuditSink, AuditedRepository, CachedRepository, CrudRepository, Entity, MemoryStore,
    Repository, RepositoryResult, TracingAuditSink, Validator,
};

// == Entity Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Technology,
    Contact,
    About,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Project,
        EntityKind::Technology,
        EntityKind::Contact,
        EntityKind::About,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => Project::ENTITY_TYPE,
            EntityKind::Technology => Technology::ENTITY_TYPE,
            EntityKind::Contact => ContactInfo::ENTITY_TYPE,
            EntityKind::About => AboutContent::ENTITY_TYPE,
        }
    }
}

impl FromStr for EntityKind {
    type Err = RegistryError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| RegistryError::UnknownEntityType(name.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Repository Handle ==
/// A repository for one of the known entity types.
#[derive(Clone)]
pub enum RepositoryHandle {
    Project(Arc<dyn CrudRepository<Project>>),
    Technology(Arc<dyn CrudRepository<Technology>>),
    Contact(Arc<dyn CrudRepository<ContactInfo>>),
    About(Arc<dyn CrudRepository<AboutContent>>),
}

impl RepositoryHandle {
    pub fn kind(&self) -> EntityKind {
        match self {
            RepositoryHandle::Project(_) => EntityKind::Project,
            RepositoryHandle::Technology(_) => EntityKind::Technology,
            RepositoryHandle::Contact(_) => EntityKind::Contact,
            RepositoryHandle::About(_) => EntityKind::About,
        }
    }

    pub async fn count(&self) -> RepositoryResult<usize> {
        match self {
            RepositoryHandle::Project(repo) => repo.count(None).await,
            RepositoryHandle::Technology(repo) => repo.count(None).await,
            RepositoryHandle::Contact(repo) => repo.count(None).await,
            RepositoryHandle::About(repo) => repo.count(None).await,
        }
    }

    /// The whole collection as a JSON array.
    pub async fn export(&self) -> Result<Value> {
        match self {
            RepositoryHandle::Project(repo) => export_all(repo.as_ref()).await,
            RepositoryHandle::Technology(repo) => export_all(repo.as_ref()).await,
            RepositoryHandle::Contact(repo) => export_all(repo.as_ref()).await,
            RepositoryHandle::About(repo) => export_all(repo.as_ref()).await,
        }
    }
}

impl fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RepositoryHandle").field(&self.kind()).finish()
    }
}

async fn export_all<E: Entity>(repo: &dyn CrudRepository<E>) -> Result<Value> {
    let items = repo.get_all(None).await.into_result()?;
    Ok(serde_json::to_value(items).map_err(StoreError::from)?)
}

// == Registry ==
type Slot<E> = Mutex<HashMap<RepositoryConfig, Arc<dyn CrudRepository<E>>>>;

/// Memoizing factory for the portfolio repositories.
///
/// Every repository it builds shares the registry's audit sink and clock.
pub struct RepositoryRegistry {
    sink: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    projects: Slot<Project>,
    technologies: Slot<Technology>,
    contacts: Slot<ContactInfo>,
    about: Slot<AboutContent>,
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryRegistry {
    /// Registry with wall-clock time and audit events sent to `tracing`.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(TracingAuditSink), Arc::new(SystemClock))
    }

    pub fn with_parts(sink: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sink,
            clock,
            projects: Mutex::default(),
            technologies: Mutex::default(),
            contacts: Mutex::default(),
            about: Mutex::default(),
        }
    }

    /// Repository for the entity type called `name`.
    ///
    /// Returns the same instance for the same `(name, config)` pair.
    pub fn create(
        &self,
        name: &str,
        config: RepositoryConfig,
    ) -> std::result::Result<RepositoryHandle, RegistryError> {
        let kind: EntityKind = name.parse()?;
        Ok(self.get(kind, config))
    }

    pub fn get(&self, kind: EntityKind, config: RepositoryConfig) -> RepositoryHandle {
        match kind {
            EntityKind::Project => RepositoryHandle::Project(self.projects(config)),
            EntityKind::Technology => RepositoryHandle::Technology(self.technologies(config)),
            EntityKind::Contact => RepositoryHandle::Contact(self.contacts(config)),
            EntityKind::About => RepositoryHandle::About(self.about(config)),
        }
    }

    pub fn projects(&self, config: RepositoryConfig) -> Arc<dyn CrudRepository<Project>> {
        self.lookup(&self.projects, config, || (project::seed(), ProjectValidator))
    }

    pub fn technologies(&self, config: RepositoryConfig) -> Arc<dyn CrudRepository<Technology>> {
        self.lookup(&self.technologies, config, || {
            (technology::seed(), TechnologyValidator)
        })
    }

    pub fn contacts(&self, config: RepositoryConfig) -> Arc<dyn CrudRepository<ContactInfo>> {
        self.lookup(&self.contacts, config, || {
            (contact::seed(), ContactInfoValidator)
        })
    }

    pub fn about(&self, config: RepositoryConfig) -> Arc<dyn CrudRepository<AboutContent>> {
        self.lookup(&self.about, config, || (about::seed(), AboutContentValidator))
    }

    /// Number of repositories built so far.
    pub fn len(&self) -> usize {
        slot_len(&self.projects)
            + slot_len(&self.technologies)
            + slot_len(&self.contacts)
            + slot_len(&self.about)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every built repository. Handles already given out keep working.
    pub fn clear(&self) {
        clear_slot(&self.projects);
        clear_slot(&self.technologies);
        clear_slot(&self.contacts);
        clear_slot(&self.about);
        info!("repository registry cleared");
    }

    fn lookup<E, V>(
        &self,
        slot: &Slot<E>,
        config: RepositoryConfig,
        parts: impl FnOnce() -> (Vec<E>, V),
    ) -> Arc<dyn CrudRepository<E>>
    where
        E: Entity,
        V: Validator<E> + 'static,
    {
        let mut built = slot.lock().unwrap_or_else(PoisonError::into_inner);
        built
            .entry(config)
            .or_insert_with(|| {
                let (seed, validator) = parts();
                self.build(seed, validator, config)
            })
            .clone()
    }

    /// Engine, then the cache if enabled, then auditing if enabled.
    fn build<E, V>(
        &self,
        seed: Vec<E>,
        validator: V,
        config: RepositoryConfig,
    ) -> Arc<dyn CrudRepository<E>>
    where
        E: Entity,
        V: Validator<E> + 'static,
    {
        info!(
            entity_type = E::ENTITY_TYPE,
            cache = config.cache_enabled,
            cache_ttl = config.cache_ttl,
            audit = config.enable_audit_log,
            "building repository"
        );

        let clock = self.clock.clone();
        let store = MemoryStore::new(seed);
        let engine = Repository::with_clock(store, validator, config, clock.clone());

        match (config.cache_enabled, config.enable_audit_log) {
            (false, false) => Arc::new(engine),
            (true, false) => Arc::new(CachedRepository::with_clock(engine, config.cache_ttl, clock)),
            (false, true) => Arc::new(AuditedRepository::with_clock(
                engine,
                self.sink.clone(),
                clock,
            )),
            (true, true) => Arc::new(AuditedRepository::with_clock(
                CachedRepository::with_clock(engine, config.cache_ttl, clock.clone()),
                self.sink.clone(),
                clock,
            )),
        }
    }
}

fn slot_len<E>(slot: &Slot<E>) -> usize {
    slot.lock().unwrap_or_else(PoisonError::into_inner).len()
}

fn clear_slot<E>(slot: &Slot<E>) {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clear();
}
