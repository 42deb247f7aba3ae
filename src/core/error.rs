//! Error types for timetable operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entry::EntryId;

/// Errors produced by the schedule service and its collaborators.
///
/// Every variant is a structured rejection; none of them is meant to surface
/// as a generic failure. Use [`ScheduleError::remedy`] to decide what the
/// caller should do next.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// No identity was presented.
    #[error("access token required")]
    Unauthenticated,
    /// An identity was presented but could not be verified.
    #[error("invalid or expired token")]
    InvalidToken,
    /// Valid identity without the role the operation needs.
    #[error("teacher access required")]
    Forbidden,
    /// One or more required fields were absent or blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// Partial update carried no fields at all.
    #[error("no fields to update")]
    EmptyUpdate,
    /// Malformed time of day, or `start >= end`.
    #[error("invalid time range: {0}")]
    InvalidRange(String),
    /// No weekday flag was set.
    #[error("at least one weekday must be selected")]
    InvalidWeekdays,
    /// The class already has an entry at an overlapping time.
    #[error("time conflict detected{}", describe_conflict(.conflicting))]
    ClassConflict {
        /// Entry the candidate collides with, when known.
        conflicting: Option<EntryId>,
    },
    /// The room is already booked at an overlapping time.
    #[error("room is not available at this time{}", describe_conflict(.conflicting))]
    RoomConflict {
        /// Entry the candidate collides with, when known.
        conflicting: Option<EntryId>,
    },
    /// Update or delete targeted an absent entry.
    #[error("entry {0} not found")]
    NotFound(EntryId),
    /// Unexpected store failure.
    #[error("internal error: {0}")]
    Internal(String),
}

#[allow(clippy::ref_option)]
fn describe_conflict(conflicting: &Option<EntryId>) -> String {
    conflicting.map_or_else(String::new, |id| format!(" with entry {id}"))
}

/// What a caller should do about a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remedy {
    /// Present a valid identity (or one with more privileges).
    Authenticate,
    /// Correct the request payload.
    FixInput,
    /// Choose a different time, day or room.
    PickAnotherSlot,
    /// The target does not exist.
    NotFound,
    /// Transient failure; try again later.
    RetryLater,
}

impl ScheduleError {
    /// Classify the error by the action it asks of the caller.
    pub const fn remedy(&self) -> Remedy {
        match self {
            Self::Unauthenticated | Self::InvalidToken | Self::Forbidden => Remedy::Authenticate,
            Self::MissingFields(_)
            | Self::EmptyUpdate
            | Self::InvalidRange(_)
            | Self::InvalidWeekdays => Remedy::FixInput,
            Self::ClassConflict { .. } | Self::RoomConflict { .. } => Remedy::PickAnotherSlot,
            Self::NotFound(_) => Remedy::NotFound,
            Self::Internal(_) => Remedy::RetryLater,
        }
    }

    /// HTTP-style status code for transport layers.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated | Self::InvalidToken => 401,
            Self::Forbidden => 403,
            Self::MissingFields(_)
            | Self::EmptyUpdate
            | Self::InvalidRange(_)
            | Self::InvalidWeekdays => 400,
            Self::ClassConflict { .. } | Self::RoomConflict { .. } => 409,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable name of the variant.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidToken => "invalid_token",
            Self::Forbidden => "forbidden",
            Self::MissingFields(_) => "missing_fields",
            Self::EmptyUpdate => "empty_update",
            Self::InvalidRange(_) => "invalid_range",
            Self::InvalidWeekdays => "invalid_weekdays",
            Self::ClassConflict { .. } => "class_conflict",
            Self::RoomConflict { .. } => "room_conflict",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// Id of the colliding entry for conflict rejections.
    pub const fn conflicting_entry(&self) -> Option<EntryId> {
        match self {
            Self::ClassConflict { conflicting } | Self::RoomConflict { conflicting } => *conflicting,
            _ => None,
        }
    }
}

/// Application-facing result using anyhow for bootstrap contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
