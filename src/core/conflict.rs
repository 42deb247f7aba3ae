//! Class- and room-scope conflict detection.
//!
//! The checker is read-only: it pulls each scope through a [`ScopeReader`]
//! and applies [`conflicts`] to every entry. Class scope is always examined
//! before room scope, so a candidate colliding in both is reported as a class
//! conflict.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::entry::{EntryFields, EntryId, TimetableEntry};
use crate::core::interval::conflicts;
use crate::core::store::{ScopeReader, StoreError};
use crate::core::ScheduleError;

/// Which invariant a candidate would break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Same class.
    Class,
    /// Same room.
    Room,
}

/// Outcome of a conflict check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "entry", rename_all = "snake_case")]
pub enum ConflictResult {
    /// Safe to persist.
    NoConflict,
    /// Collides with this entry of the same class.
    ClassConflict(EntryId),
    /// Collides with this entry in the same room.
    RoomConflict(EntryId),
}

impl ConflictResult {
    /// True for [`ConflictResult::NoConflict`].
    pub const fn is_clear(self) -> bool {
        matches!(self, Self::NoConflict)
    }

    /// Scope of the conflict, if any.
    pub const fn scope(self) -> Option<Scope> {
        match self {
            Self::NoConflict => None,
            Self::ClassConflict(_) => Some(Scope::Class),
            Self::RoomConflict(_) => Some(Scope::Room),
        }
    }

    /// Turn a conflict into the matching rejection.
    pub const fn into_result(self) -> Result<(), ScheduleError> {
        match self {
            Self::NoConflict => Ok(()),
            Self::ClassConflict(id) => Err(ScheduleError::ClassConflict {
                conflicting: Some(id),
            }),
            Self::RoomConflict(id) => Err(ScheduleError::RoomConflict {
                conflicting: Some(id),
            }),
        }
    }
}

fn first_collision(candidate: &EntryFields, scope: &[TimetableEntry]) -> Option<EntryId> {
    let slot = candidate.slot();
    scope
        .iter()
        .find(|existing| conflicts(&slot, &existing.slot()))
        .map(|existing| existing.id)
}

/// Decide whether persisting `candidate` would violate either scope.
///
/// `exclude` is the id of the entry being updated, so it does not collide
/// with its own previous version.
pub async fn check_conflicts<R>(
    reader: &mut R,
    candidate: &EntryFields,
    exclude: Option<EntryId>,
) -> Result<ConflictResult, StoreError>
where
    R: ScopeReader + ?Sized,
{
    let class_scope = reader.fetch_by_class(&candidate.class_id, exclude).await?;
    tracing::debug!(
        class = %candidate.class_id,
        candidates = class_scope.len(),
        "checking class scope"
    );
    if let Some(id) = first_collision(candidate, &class_scope) {
        return Ok(ConflictResult::ClassConflict(id));
    }

    let room_scope = reader.fetch_by_room(&candidate.room, exclude).await?;
    tracing::debug!(
        room = %candidate.room,
        candidates = room_scope.len(),
        "checking room scope"
    );
    if let Some(id) = first_collision(candidate, &room_scope) {
        return Ok(ConflictResult::RoomConflict(id));
    }

    Ok(ConflictResult::NoConflict)
}

/// A plain snapshot of entries is a valid reader.
#[async_trait]
impl ScopeReader for Vec<TimetableEntry> {
    async fn fetch_by_class(
        &mut self,
        class_id: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(snapshot_scope(self, exclude, |e| e.class_id == class_id))
    }

    async fn fetch_by_room(
        &mut self,
        room: &str,
        exclude: Option<EntryId>,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(snapshot_scope(self, exclude, |e| e.room == room))
    }
}

fn snapshot_scope(
    entries: &[TimetableEntry],
    exclude: Option<EntryId>,
    in_scope: impl Fn(&TimetableEntry) -> bool,
) -> Vec<TimetableEntry> {
    let mut scope: Vec<TimetableEntry> = entries
        .iter()
        .filter(|e| Some(e.id) != exclude && in_scope(e))
        .cloned()
        .collect();
    scope.sort_by_key(|e| e.id);
    scope
}
