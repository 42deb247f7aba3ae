//! Single-writer locks keyed by class, room and entry.
//!
//! Used when the store cannot isolate a check-then-commit sequence on its
//! own. Keys handed to one [`ScopeLocks::acquire`] call are locked in sorted
//! order, so two writers needing overlapping key sets cannot deadlock.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::core::entry::EntryId;

/// Something a writer needs exclusive access to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeKey {
    /// One existing entry, held across read-merge-write of an update.
    Entry(EntryId),
    /// All entries of a class.
    Class(String),
    /// All entries in a room.
    Room(String),
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(id) => write!(f, "entry:{id}"),
            Self::Class(class) => write!(f, "class:{class}"),
            Self::Room(room) => write!(f, "room:{room}"),
        }
    }
}

/// Table of per-key async mutexes.
#[derive(Default)]
pub struct ScopeLocks {
    table: Mutex<HashMap<ScopeKey, Arc<AsyncMutex<()>>>>,
}

/// Holds every lock of one acquisition; dropping it releases them all.
pub struct ScopeGuard {
    keys: Vec<ScopeKey>,
    _held: Vec<OwnedMutexGuard<()>>,
}

impl ScopeGuard {
    /// Keys held, in acquisition order.
    pub fn keys(&self) -> &[ScopeKey] {
        &self.keys
    }
}

impl fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard").field("keys", &self.keys).finish()
    }
}

impl ScopeLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, key: &ScopeKey) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock();
        Arc::clone(table.entry(key.clone()).or_default())
    }

    /// Lock every key, waiting for current holders to finish.
    pub async fn acquire(&self, keys: impl IntoIterator<Item = ScopeKey>) -> ScopeGuard {
        let mut keys: Vec<ScopeKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut held = Vec::with_capacity(keys.len());
        for key in &keys {
            let handle = self.handle(key);
            held.push(handle.lock_owned().await);
        }
        tracing::trace!(keys = ?keys, "scope locks acquired");
        ScopeGuard { keys, _held: held }
    }

    /// Drop table slots nobody holds or waits on.
    pub fn prune(&self) {
        self.table.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// True when no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}
