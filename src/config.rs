//! Configuration Module
//!
//! Repository options, loadable from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_TTL_SECS;

/// Options recognized by every repository.
///
/// Fixed once a repository is built. Also the memoization key of the
/// registry, hence `Copy + Eq + Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Wrap the repository in a TTL cache
    pub cache_enabled: bool,
    /// Cache entry lifetime in seconds
    pub cache_ttl: u64,
    /// Run the validator before `create`
    pub validate_on_create: bool,
    /// Run the validator before `update`
    pub validate_on_update: bool,
    /// Reserved; no repository implements soft deletion yet
    pub enable_soft_delete: bool,
    /// Emit audit events for reads and mutations
    pub enable_audit_log: bool,
}

impl RepositoryConfig {
    /// Creates a new RepositoryConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REPO_CACHE_ENABLED` - Enable caching (default: false)
    /// - `REPO_CACHE_TTL` - Cache TTL in seconds (default: 300)
    /// - `REPO_VALIDATE_ON_CREATE` - Validate creates (default: true)
    /// - `REPO_VALIDATE_ON_UPDATE` - Validate updates (default: true)
    /// - `REPO_SOFT_DELETE` - Reserved (default: false)
    /// - `REPO_AUDIT_LOG` - Enable audit events (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_enabled: env_flag("REPO_CACHE_ENABLED").unwrap_or(defaults.cache_enabled),
            cache_ttl: env::var("REPO_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl),
            validate_on_create: env_flag("REPO_VALIDATE_ON_CREATE")
                .unwrap_or(defaults.validate_on_create),
            validate_on_update: env_flag("REPO_VALIDATE_ON_UPDATE")
                .unwrap_or(defaults.validate_on_update),
            enable_soft_delete: env_flag("REPO_SOFT_DELETE").unwrap_or(defaults.enable_soft_delete),
            enable_audit_log: env_flag("REPO_AUDIT_LOG").unwrap_or(defaults.enable_audit_log),
        }
    }

    /// Same config with caching turned on at the given TTL.
    pub fn with_cache(mut self, ttl_secs: u64) -> Self {
        self.cache_enabled = true;
        self.cache_ttl = ttl_secs;
        self
    }

    /// Same config with audit events turned on.
    pub fn with_audit_log(mut self) -> Self {
        self.enable_audit_log = true;
        self
    }

    /// Same config with both validation hooks turned off.
    pub fn without_validation(mut self) -> Self {
        self.validate_on_create = false;
        self.validate_on_update = false;
        self
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            cache_enabled: false,
            cache_ttl: DEFAULT_TTL_SECS,
            validate_on_create: true,
            validate_on_update: true,
            enable_soft_delete: false,
            enable_audit_log: false,
        }
    }
}

/// Reads a boolean variable; accepts `true/false`, `1/0`, `yes/no`, `on/off`.
fn env_flag(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
