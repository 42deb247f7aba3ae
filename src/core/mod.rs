//! Core timetable model, conflict detection and the schedule service.

pub mod audit;
pub mod auth;
pub mod conflict;
pub mod entry;
pub mod error;
pub mod interval;
pub mod locks;
pub mod service;
pub mod store;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use auth::{AuthError, AuthorizationGate, Caller, Capability, Role};
pub use conflict::{check_conflicts, ConflictResult, Scope};
pub use entry::{EntryDraft, EntryFields, EntryFilter, EntryId, EntryPatch, TimetableEntry, UserId};
pub use error::{AppResult, Remedy, ScheduleError};
pub use interval::{conflicts, overlaps, shares_weekday, Slot, TimeRange, Weekday, WeekdaySet};
pub use service::{ScheduleService, WriteStage};
pub use store::{Isolation, ScopeReader, StoreError, StoreTransaction, TimetableStore};
