//! Audit event model - structured records for every authentication attempt
//! and every consent action. Never carries secret material.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event_type: String,
    pub partner_id: Option<Uuid>,
    pub outcome: AuditOutcome,
    /// Failure cause or extra context. May name an unknown key or inactive
    /// partner; this detail stays in the audit trail and is never folded
    /// into caller-visible errors.
    pub detail: Option<String>,
    /// Caller network origin, when the transport layer supplies one.
    pub origin: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn success(event_type: impl Into<String>, partner_id: Option<Uuid>) -> Self {
        Self {
            event_type: event_type.into(),
            partner_id,
            outcome: AuditOutcome::Success,
            detail: None,
            origin: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(
        event_type: impl Into<String>,
        partner_id: Option<Uuid>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            partner_id,
            outcome: AuditOutcome::Failure,
            detail: Some(detail.into()),
            origin: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}
