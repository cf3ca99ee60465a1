//! Portfolio Store - prints the site's content collections as JSON
//!
//! Usage: `portfolio-store [project|technology|contact|about]`. Without an
//! argument every collection is printed.

use std::env;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_store::{EntityKind, RepositoryConfig, RepositoryRegistry};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load repository configuration from environment variables
/// 3. Build the registry and resolve the requested entity types
/// 4. Export each collection and print it to stdout
#[tokio::main]
async fn main() -> Result<()> {
    // Defaults to "info" for this crate and audit events, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_store=info,audit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RepositoryConfig::from_env();
    info!(
        "Configuration loaded: cache_enabled={}, cache_ttl={}s, audit_log={}",
        config.cache_enabled, config.cache_ttl, config.enable_audit_log
    );

    let kinds = match env::args().nth(1) {
        Some(name) => vec![name.parse::<EntityKind>()?],
        None => EntityKind::ALL.to_vec(),
    };

    let registry = RepositoryRegistry::new();
    let mut output = Map::new();
    for kind in kinds {
        let rows = registry
            .get(kind, config)
            .export()
            .await
            .with_context(|| format!("failed to export {kind} collection"))?;
        output.insert(kind.to_string(), rows);
    }

    let json = match output.len() {
        1 => output.into_iter().next().map(|(_, rows)| rows).unwrap_or(Value::Null),
        _ => Value::Object(output),
    };
    println!("{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}
