//! Store selected at runtime from configuration.

use async_trait::async_trait;

use crate::core::entry::{EntryFields, EntryFilter, EntryId, TimetableEntry, UserId};
use crate::core::store::{Isolation, ScopeReader, StoreError, StoreTransaction, TimetableStore};
use crate::infra::store::{InMemoryStore, InMemoryTransaction, JournalStore, JournalTransaction};

/// Either shipped backend.
#[derive(Clone)]
pub enum AnyStore {
    /// Serializable in-memory table.
    InMemory(InMemoryStore),
    /// JSON-lines journal on disk.
    Journal(JournalStore),
}

/// Transaction of an [`AnyStore`].
pub enum AnyTransaction {
    /// In-memory transaction.
    InMemory(InMemoryTransaction),
    /// Journal pass-through handle.
    Journal(JournalTransaction),
}

impl From<InMemoryStore> for AnyStore {
    fn from(store: InMemoryStore) -> Self {
        Self::InMemory(store)
    }
}

impl From<JournalStore> for AnyStore {
    fn from(store: JournalStore) -> Self {
        Self::Journal(store)
    }
}

#[async_trait]
impl ScopeReader for AnyTransaction {
    async fn fetch_by_class(
        &mut self,
        class_id: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        match self {
            Self::InMemory(tx) => tx.fetch_by_class(class_id, exclude).await,
            Self::Journal(tx) => tx.fetch_by_class(class_id, exclude).await,
        }
    }

    async fn fetch_by_room(
        &mut self,
        room: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        match self {
            Self::InMemory(tx) => tx.fetch_by_room(room, exclude).await,
            Self::Journal(tx) => tx.fetch_by_room(room, exclude).await,
        }
    }
}

#[async_trait]
impl StoreTransaction for AnyTransaction {
    async fn get(&mut self, id: EntryId) -> Result<Option<TimetableEntry>, StoreError> {
        match self {
            Self::InMemory(tx) => tx.get(id).await,
            Self::Journal(tx) => tx.get(id).await,
        }
    }

    async fn insert(&mut self, owner_id: UserId, fields: EntryFields) -> Result<EntryId, StoreError> {
        match self {
            Self::InMemory(tx) => tx.insert(owner_id, fields).await,
            Self::Journal(tx) => tx.insert(owner_id, fields).await,
        }
    }

    async fn update(&mut self, id: EntryId, fields: EntryFields) -> Result<u64, StoreError> {
        match self {
            Self::InMemory(tx) => tx.update(id, fields).await,
            Self::Journal(tx) => tx.update(id, fields).await,
        }
    }

    async fn delete(&mut self, id: EntryId) -> Result<u64, StoreError> {
        match self {
            Self::InMemory(tx) => tx.delete(id).await,
            Self::Journal(tx) => tx.delete(id).await,
        }
    }

    async fn commit(self) -> Result<(), StoreError> {
        match self {
            Self::InMemory(tx) => tx.commit().await,
            Self::Journal(tx) => tx.commit().await,
        }
    }
}

#[async_trait]
impl TimetableStore for AnyStore {
    type Tx = AnyTransaction;

    fn isolation(&self) -> Isolation {
        match self {
            Self::InMemory(store) => store.isolation(),
            Self::Journal(store) => store.isolation(),
        }
    }

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(match self {
            Self::InMemory(store) => AnyTransaction::InMemory(store.begin().await?),
            Self::Journal(store) => AnyTransaction::Journal(store.begin().await?),
        })
    }

    async fn list(&self, filter: &EntryFilter) -> Result<Vec<TimetableEntry>, StoreError> {
        match self {
            Self::InMemory(store) => store.list(filter).await,
            Self::Journal(store) => store.list(filter).await,
        }
    }
}
