//! Repository Module
//!
//! Generic CRUD/query engine over in-memory entity collections, plus the
//! caching and auditing decorators that can be layered around it.

mod audit;
mod audited;
mod cached;
mod engine;
mod entity;
mod envelope;
pub(crate) mod filter;
mod pagination;
mod store;
mod traits;
mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use audit::{AuditAction, AuditEvent, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use audited::AuditedRepository;
pub use cached::CachedRepository;
pub use engine::Repository;
pub use entity::{Entity, FieldValue, SEARCH_FIELDS};
pub use envelope::{ErrorInfo, RepositoryResult};
pub use filter::{FilterValue, Filters};
pub use pagination::{sort_entities, PageInfo, Paginated, Pagination, SortOrder};
pub use store::{MemoryStore, Store};
pub use traits::CrudRepository;
pub use validation::{
    Checks, NoopValidator, ValidationError, ValidationErrorKind, ValidationResult, Validator,
};
