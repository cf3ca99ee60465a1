//! Portfolio Store - content repositories for a portfolio site
//!
//! Generic CRUD/query repositories over in-memory entity collections, with
//! an optional TTL cache, pluggable validation and audit logging, and a
//! registry that hands out configured repositories by entity type name.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod repository;

pub use config::RepositoryConfig;
pub use error::{ErrorCode, RegistryError, RepositoryError, StoreError};
pub use registry::{EntityKind, RepositoryHandle, RepositoryRegistry};
pub use repository::{CrudRepository, RepositoryResult};
