//! Audit sink implementations.
//!
//! Every write request ends in exactly one audit event: a commit, or a
//! rejection tagged with the stage that stopped it.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::entry::{EntryId, UserId};
use crate::core::service::WriteStage;
use crate::util::clock::now;

/// Kind of write an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Entry inserted.
    Create,
    /// Entry changed.
    Update,
    /// Entry removed.
    Delete,
    /// Request rejected.
    Reject,
}

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier (UUID v4).
    pub event_id: String,
    /// Entry affected, when one exists.
    pub entry_id: Option<EntryId>,
    /// User who issued the request.
    pub actor: UserId,
    /// What happened.
    pub action: AuditAction,
    /// Stage reached; for rejections, the stage that rejected.
    pub stage: WriteStage,
    /// Rejection kind or other context.
    pub detail: Option<String>,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Shared handle, so a caller can keep reading a sink it handed to the service.
impl<S: AuditSink> AuditSink for Arc<Mutex<S>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that only emits structured log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        tracing::info!(
            target: "timeplan::audit",
            event_id = %event.event_id,
            entry = ?event.entry_id,
            actor = event.actor,
            action = ?event.action,
            stage = ?event.stage,
            detail = event.detail.as_deref().unwrap_or(""),
            "audit"
        );
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    entry_id: Option<EntryId>,
    actor: UserId,
    action: AuditAction,
    stage: WriteStage,
    detail: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        entry_id,
        actor,
        action,
        stage,
        detail,
        created_at: now(),
    }
}
