//! Storage abstraction for timetable entries.
//!
//! The schedule service never talks to a concrete database. It opens a
//! [`StoreTransaction`] per write request, runs the conflict checks through
//! it, writes, and commits. Dropping a transaction without committing must
//! discard whatever it staged.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::entry::{EntryFields, EntryFilter, EntryId, TimetableEntry, UserId};

/// Failures raised by store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend-specific failure with context.
    #[error("store backend error: {0}")]
    Backend(String),
    /// Filesystem failure.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Record could not be encoded or decoded.
    #[error("store codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Isolation a store guarantees for the lifetime of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    /// Reads and writes inside a transaction behave as if no other
    /// transaction ran concurrently.
    Serializable,
    /// Every call hits shared state directly; concurrent writers can
    /// interleave between a read and a write.
    None,
}

/// Read-only view over the entries relevant to one candidate.
///
/// Implementations return entries in ascending id order.
#[async_trait]
pub trait ScopeReader: Send {
    /// Entries of `class_id`, minus `exclude`.
    async fn fetch_by_class(
        &mut self,
        class_id: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError>;

    /// Entries booked in `room`, minus `exclude`.
    async fn fetch_by_room(
        &mut self,
        room: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError>;
}

/// A unit of work against the store.
#[async_trait]
pub trait StoreTransaction: ScopeReader {
    /// Look up one entry.
    async fn get(&mut self, id: EntryId) -> Result<Option<TimetableEntry>, StoreError>;

    /// Insert a new entry and return its id.
    async fn insert(&mut self, owner_id: UserId, fields: EntryFields) -> Result<EntryId, StoreError>;

    /// Replace the mutable fields of `id`; returns the number of rows touched.
    async fn update(&mut self, id: EntryId, fields: EntryFields) -> Result<u64, StoreError>;

    /// Remove `id`; returns the number of rows touched.
    async fn delete(&mut self, id: EntryId) -> Result<u64, StoreError>;

    /// Make staged writes durable and visible.
    async fn commit(self) -> Result<(), StoreError>;
}

/// Durable entry storage with transactional access.
#[async_trait]
pub trait TimetableStore: Send + Sync + 'static {
    /// Transaction handle type.
    type Tx: StoreTransaction + 'static;

    /// Isolation provided by [`TimetableStore::begin`].
    fn isolation(&self) -> Isolation;

    /// Open a transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Entries passing `filter`, in listing order.
    async fn list(&self, filter: &EntryFilter) -> Result<Vec<TimetableEntry>, StoreError>;
}

impl From<StoreError> for crate::core::ScheduleError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
