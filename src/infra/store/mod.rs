//! Timetable store backends.

pub mod any;
pub mod journal;
pub mod memory;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entry::{EntryFields, EntryFilter, EntryId, TimetableEntry, UserId};

pub use any::{AnyStore, AnyTransaction};
pub use journal::{JournalStore, JournalTransaction};
pub use memory::{InMemoryStore, InMemoryTransaction};

/// One mutation of the entry table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreChange {
    /// A new entry.
    Insert {
        /// Entry as inserted.
        entry: TimetableEntry,
    },
    /// New state of an existing entry.
    Update {
        /// Entry after the update.
        entry: TimetableEntry,
    },
    /// Entry removed.
    Delete {
        /// Removed id.
        id: EntryId,
    },
}

/// Entry table shared by the backends. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    last_id: EntryId,
    entries: BTreeMap<EntryId, TimetableEntry>,
}

impl StoreState {
    pub(crate) fn get(&self, id: EntryId) -> Option<TimetableEntry> {
        self.entries.get(&id).cloned()
    }

    fn scope(
        &self,
        exclude: Option<EntryId>,
        in_scope: impl Fn(&TimetableEntry) -> bool,
    ) -> Vec<TimetableEntry> {
        self.entries
            .values()
            .filter(|e| Some(e.id) != exclude && in_scope(e))
            .cloned()
            .collect()
    }

    pub(crate) fn by_class(&self, class_id: &str, exclude: Option<EntryId>) -> Vec<TimetableEntry> {
        self.scope(exclude, |e| e.class_id == class_id)
    }

    pub(crate) fn by_room(&self, room: &str, exclude: Option<EntryId>) -> Vec<TimetableEntry> {
        self.scope(exclude, |e| e.room == room)
    }

    pub(crate) fn list(&self, filter: &EntryFilter) -> Vec<TimetableEntry> {
        let mut entries: Vec<TimetableEntry> = self
            .entries
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        entries.sort_by(TimetableEntry::listing_order);
        entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// The insert that would happen next, without applying it.
    pub(crate) fn plan_insert(
        &self,
        owner_id: UserId,
        fields: EntryFields,
        now: DateTime<Utc>,
    ) -> TimetableEntry {
        TimetableEntry::from_fields(self.last_id + 1, owner_id, fields, now)
    }

    /// The update of `id`, or `None` if it does not exist.
    pub(crate) fn plan_update(
        &self,
        id: EntryId,
        fields: EntryFields,
        now: DateTime<Utc>,
    ) -> Option<TimetableEntry> {
        let mut entry = self.get(id)?;
        entry.apply(fields, now);
        Some(entry)
    }

    /// Apply a change; returns the number of rows touched.
    pub(crate) fn apply(&mut self, change: StoreChange) -> u64 {
        match change {
            StoreChange::Insert { entry } => {
                self.last_id = self.last_id.max(entry.id);
                self.entries.insert(entry.id, entry);
                1
            }
            StoreChange::Update { entry } => match self.entries.get_mut(&entry.id) {
                Some(slot) => {
                    *slot = entry;
                    1
                }
                None => 0,
            },
            StoreChange::Delete { id } => u64::from(self.entries.remove(&id).is_some()),
        }
    }
}
