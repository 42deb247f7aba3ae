//! Schedule service: authorize, validate, check conflicts, commit.
//!
//! Each write walks `Received -> Authorized -> Validated -> ConflictChecked
//! -> Committed` and stops at the first gate that rejects it. The stage a
//! request reached is logged and recorded in the audit sink either way.
//!
//! Check-then-commit runs inside one store transaction. When the store does
//! not isolate transactions (or the lock policy demands it), the service also
//! holds single-writer locks on the candidate's class and room for the whole
//! sequence. Locks are always taken before a transaction is opened.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::ScopeLockPolicy;
use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::auth::{Caller, Capability};
use crate::core::conflict::check_conflicts;
use crate::core::entry::{EntryDraft, EntryFields, EntryFilter, EntryId, EntryPatch, TimetableEntry};
use crate::core::interval::Weekday;
use crate::core::locks::{ScopeGuard, ScopeKey, ScopeLocks};
use crate::core::store::{Isolation, StoreTransaction, TimetableStore};
use crate::core::ScheduleError;

/// Progress of a write request through the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStage {
    /// Request accepted for processing.
    Received,
    /// Caller holds the teacher role.
    Authorized,
    /// Fields present and well-formed.
    Validated,
    /// Neither class nor room scope collides.
    ConflictChecked,
    /// Write is durable.
    Committed,
}

fn scope_keys(fields: &EntryFields) -> [ScopeKey; 2] {
    [
        ScopeKey::Class(fields.class_id.clone()),
        ScopeKey::Room(fields.room.clone()),
    ]
}

/// Orchestrates timetable reads and writes over an injected store.
pub struct ScheduleService<S> {
    store: S,
    locks: ScopeLocks,
    lock_policy: ScopeLockPolicy,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
}

impl<S: TimetableStore> ScheduleService<S> {
    /// Create a service over `store` with the default lock policy.
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: ScopeLocks::new(),
            lock_policy: ScopeLockPolicy::default(),
            audit: None,
        }
    }

    /// Override when scope locks are taken.
    #[must_use]
    pub const fn with_lock_policy(mut self, policy: ScopeLockPolicy) -> Self {
        self.lock_policy = policy;
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Whether writes serialize through the scope-lock table.
    pub fn uses_scope_locks(&self) -> bool {
        self.lock_policy == ScopeLockPolicy::Always || self.store.isolation() == Isolation::None
    }

    async fn lock(&self, keys: impl IntoIterator<Item = ScopeKey>) -> Option<ScopeGuard> {
        if self.uses_scope_locks() {
            Some(self.locks.acquire(keys).await)
        } else {
            None
        }
    }

    /// Create an entry owned by `caller`; returns the new id.
    pub async fn create_entry(
        &self,
        caller: &Caller,
        draft: &EntryDraft,
    ) -> Result<EntryId, ScheduleError> {
        let mut stage = WriteStage::Received;
        let result = self.try_create(caller, draft, &mut stage).await;
        let entry = result.as_ref().ok().copied();
        self.conclude(caller, AuditAction::Create, entry, stage, result)
    }

    async fn try_create(
        &self,
        caller: &Caller,
        draft: &EntryDraft,
        stage: &mut WriteStage,
    ) -> Result<EntryId, ScheduleError> {
        caller.require(Capability::Write)?;
        *stage = WriteStage::Authorized;

        let fields = draft.validate()?;
        *stage = WriteStage::Validated;

        let _guard = self.lock(scope_keys(&fields)).await;
        let mut tx = self.store.begin().await?;
        check_conflicts(&mut tx, &fields, None).await?.into_result()?;
        *stage = WriteStage::ConflictChecked;

        let id = tx.insert(caller.id, fields).await?;
        tx.commit().await?;
        *stage = WriteStage::Committed;
        Ok(id)
    }

    /// Apply `patch` to entry `id`, re-checking the merged entry against
    /// every other entry.
    pub async fn update_entry(
        &self,
        caller: &Caller,
        id: EntryId,
        patch: &EntryPatch,
    ) -> Result<(), ScheduleError> {
        let mut stage = WriteStage::Received;
        let result = self.try_update(caller, id, patch, &mut stage).await;
        self.conclude(caller, AuditAction::Update, Some(id), stage, result)
    }

    async fn try_update(
        &self,
        caller: &Caller,
        id: EntryId,
        patch: &EntryPatch,
        stage: &mut WriteStage,
    ) -> Result<(), ScheduleError> {
        caller.require(Capability::Write)?;
        *stage = WriteStage::Authorized;
        if patch.is_empty() {
            return Err(ScheduleError::EmptyUpdate);
        }

        // The merged scopes are only known after reading the entry, so the
        // entry lock pins it while the scope keys are worked out.
        let _guards = if self.uses_scope_locks() {
            let entry_guard = self.locks.acquire([ScopeKey::Entry(id)]).await;
            let current = self.read_existing(id).await?;
            let keys = scope_keys(&patch.merge_onto(&current).validate()?);
            Some((entry_guard, self.locks.acquire(keys).await))
        } else {
            None
        };

        let mut tx = self.store.begin().await?;
        let existing = tx.get(id).await?.ok_or(ScheduleError::NotFound(id))?;
        let fields = patch.merge_onto(&existing).validate()?;
        *stage = WriteStage::Validated;

        check_conflicts(&mut tx, &fields, Some(id)).await?.into_result()?;
        *stage = WriteStage::ConflictChecked;

        if tx.update(id, fields).await? == 0 {
            return Err(ScheduleError::NotFound(id));
        }
        tx.commit().await?;
        *stage = WriteStage::Committed;
        Ok(())
    }

    /// Remove entry `id`. No conflict check is needed.
    pub async fn delete_entry(&self, caller: &Caller, id: EntryId) -> Result<(), ScheduleError> {
        let mut stage = WriteStage::Received;
        let result = self.try_delete(caller, id, &mut stage).await;
        self.conclude(caller, AuditAction::Delete, Some(id), stage, result)
    }

    async fn try_delete(
        &self,
        caller: &Caller,
        id: EntryId,
        stage: &mut WriteStage,
    ) -> Result<(), ScheduleError> {
        caller.require(Capability::Write)?;
        *stage = WriteStage::Authorized;

        let _guard = self.lock([ScopeKey::Entry(id)]).await;
        let mut tx = self.store.begin().await?;
        if tx.delete(id).await? == 0 {
            return Err(ScheduleError::NotFound(id));
        }
        tx.commit().await?;
        *stage = WriteStage::Committed;
        Ok(())
    }

    /// Entries visible to `caller`.
    ///
    /// A student with a class is confined to that class whatever
    /// `class_filter` says; everyone else gets `class_filter` honored.
    pub async fn list_entries(
        &self,
        caller: &Caller,
        class_filter: Option<&str>,
        weekday: Option<Weekday>,
    ) -> Result<Vec<TimetableEntry>, ScheduleError> {
        caller.require(Capability::Read)?;
        let class_id = caller
            .read_scope()
            .or_else(|| class_filter.map(str::trim).filter(|c| !c.is_empty()))
            .map(str::to_string);
        let filter = EntryFilter { class_id, weekday };
        let entries = self.store.list(&filter).await.inspect_err(|err| {
            tracing::error!(error = %err, "listing entries failed");
        })?;
        tracing::debug!(actor = caller.id, filter = ?filter, count = entries.len(), "listed entries");
        Ok(entries)
    }

    /// One entry, subject to the same visibility as [`Self::list_entries`].
    pub async fn get_entry(
        &self,
        caller: &Caller,
        id: EntryId,
    ) -> Result<TimetableEntry, ScheduleError> {
        caller.require(Capability::Read)?;
        let entry = self.read_existing(id).await?;
        match caller.read_scope() {
            Some(class) if class != entry.class_id => Err(ScheduleError::NotFound(id)),
            _ => Ok(entry),
        }
    }

    async fn read_existing(&self, id: EntryId) -> Result<TimetableEntry, ScheduleError> {
        let mut tx = self.store.begin().await?;
        tx.get(id).await?.ok_or(ScheduleError::NotFound(id))
    }

    fn conclude<T>(
        &self,
        caller: &Caller,
        action: AuditAction,
        entry: Option<EntryId>,
        stage: WriteStage,
        result: Result<T, ScheduleError>,
    ) -> Result<T, ScheduleError> {
        let (audited_action, detail) = match &result {
            Ok(_) => {
                tracing::info!(actor = caller.id, entry = ?entry, action = ?action, "timetable write committed");
                (action, None)
            }
            Err(ScheduleError::Internal(msg)) => {
                tracing::error!(
                    actor = caller.id,
                    entry = ?entry,
                    action = ?action,
                    stage = ?stage,
                    error = %msg,
                    "timetable write failed"
                );
                (AuditAction::Reject, Some(format!("internal: {msg}")))
            }
            Err(err) => {
                tracing::warn!(
                    actor = caller.id,
                    entry = ?entry,
                    action = ?action,
                    stage = ?stage,
                    kind = err.kind(),
                    conflicting = ?err.conflicting_entry(),
                    error = %err,
                    "timetable write rejected"
                );
                (AuditAction::Reject, Some(format!("{}: {err}", err.kind())))
            }
        };

        if let Some(audit) = &self.audit {
            audit
                .lock()
                .record(build_audit_event(entry, caller.id, audited_action, stage, detail));
        }
        if self.uses_scope_locks() {
            self.locks.prune();
        }
        result
    }
}
