//! In-memory store with serializable transactions.
//!
//! A transaction owns the table lock from `begin` until it is committed or
//! dropped, and works on a private copy. Commit swaps the copy in; drop
//! discards it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::entry::{EntryFields, EntryFilter, EntryId, TimetableEntry, UserId};
use crate::core::store::{Isolation, ScopeReader, StoreError, StoreTransaction, TimetableStore};
use crate::infra::store::{StoreChange, StoreState};
use crate::util::clock::now;

/// In-memory store for development, tests and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    /// True when the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Exclusive unit of work over an [`InMemoryStore`].
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
}

#[async_trait]
impl ScopeReader for InMemoryTransaction {
    async fn fetch_by_class(
        &mut self,
        class_id: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self.working.by_class(class_id, exclude))
    }

    async fn fetch_by_room(
        &mut self,
        room: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self.working.by_room(room, exclude))
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn get(&mut self, id: EntryId) -> Result<Option<TimetableEntry>, StoreError> {
        Ok(self.working.get(id))
    }

    async fn insert(&mut self, owner_id: UserId, fields: EntryFields) -> Result<EntryId, StoreError> {
        let entry = self.working.plan_insert(owner_id, fields, now());
        let id = entry.id;
        self.working.apply(StoreChange::Insert { entry });
        Ok(id)
    }

    async fn update(&mut self, id: EntryId, fields: EntryFields) -> Result<u64, StoreError> {
        Ok(self
            .working
            .plan_update(id, fields, now())
            .map_or(0, |entry| self.working.apply(StoreChange::Update { entry })))
    }

    async fn delete(&mut self, id: EntryId) -> Result<u64, StoreError> {
        Ok(self.working.apply(StoreChange::Delete { id }))
    }

    async fn commit(self) -> Result<(), StoreError> {
        let Self { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl TimetableStore for InMemoryStore {
    type Tx = InMemoryTransaction;

    fn isolation(&self) -> Isolation {
        Isolation::Serializable
    }

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = (*guard).clone();
        Ok(InMemoryTransaction { guard, working })
    }

    async fn list(&self, filter: &EntryFilter) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self.state.lock().await.list(filter))
    }
}
