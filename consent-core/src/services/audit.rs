//! Audit sink - append-only destination for security-relevant events.
//!
//! Every authentication attempt and every consent request/view/grant action
//! is recorded. Sinks never receive secret material; the event model carries
//! partner identity and outcome only.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{AuditEvent, AuditOutcome};

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}

/// Sink that emits structured tracing events; the default in deployments
/// where the log pipeline is the audit trail.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) {
        match event.outcome {
            AuditOutcome::Success => tracing::info!(
                event_type = %event.event_type,
                partner_id = ?event.partner_id,
                origin = ?event.origin,
                "audit event"
            ),
            AuditOutcome::Failure => tracing::warn!(
                event_type = %event.event_type,
                partner_id = ?event.partner_id,
                detail = ?event.detail,
                origin = ?event.origin,
                "audit event"
            ),
        }
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit sink poisoned").clone()
    }

    pub fn failures(&self) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.outcome == AuditOutcome::Failure)
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) {
        self.events.lock().expect("audit sink poisoned").push(event);
    }
}
