//! Audit events and the sinks that receive them.

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Read => "read",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

/// One audited repository action with optional before/after snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

/// Receiver for audit events.
pub trait AuditSink: Send + Sync + Debug {
    fn record(&self, event: AuditEvent);
}

/// Emits each event as a structured `tracing` event under the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        info!(
            target: "audit",
            action = event.action.as_str(),
            entity_type = %event.entity_type,
            entity_id = %event.entity_id,
            before = ?event.before,
            after = ?event.after,
            timestamp = %event.timestamp,
            "repository audit event"
        );
    }
}

/// Keeps events in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Actions recorded so far, in order.
    pub fn actions(&self) -> Vec<AuditAction> {
        self.events().iter().map(|e| e.action).collect()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(action: AuditAction) -> AuditEvent {
        AuditEvent {
            action,
            entity_type: "note".into(),
            entity_id: "1".into(),
            before: None,
            after: Some(json!({ "id": "1" })),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemoryAuditSink::new();
        assert!(sink.is_empty());

        sink.record(event(AuditAction::Create));
        sink.record(event(AuditAction::Delete));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.actions(), vec![AuditAction::Create, AuditAction::Delete]);
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        TracingAuditSink.record(event(AuditAction::Read));
    }

    #[test]
    fn test_event_serialize() {
        let json = serde_json::to_value(event(AuditAction::Update)).unwrap();
        assert_eq!(json["action"], "update");
        assert!(json.get("before").is_none());
        assert_eq!(json["after"]["id"], "1");
    }
}
