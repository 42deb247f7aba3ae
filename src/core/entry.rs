//! Timetable entries and the request shapes that create or change them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::interval::{normalize, Slot, TimeRange, Weekday, WeekdaySet};
use crate::core::ScheduleError;

/// Store-assigned entry identifier.
pub type EntryId = u64;

/// Identifier of an authenticated user.
pub type UserId = u64;

/// Validated, store-ready entry content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    /// Student cohort label, e.g. `1A`.
    pub class_id: String,
    /// Physical room label.
    pub room: String,
    /// Subject taught.
    pub subject: String,
    /// Time of day.
    pub time_range: TimeRange,
    /// Days the entry recurs on.
    pub weekdays: WeekdaySet,
}

impl EntryFields {
    /// The recurring part used for conflict checks.
    pub const fn slot(&self) -> Slot {
        Slot {
            range: self.time_range,
            weekdays: self.weekdays,
        }
    }
}

/// A persisted timetable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    /// Immutable identifier.
    pub id: EntryId,
    /// Teacher who created the entry.
    pub owner_id: UserId,
    /// Student cohort label.
    pub class_id: String,
    /// Physical room label.
    pub room: String,
    /// Subject taught.
    pub subject: String,
    /// Time of day.
    pub time_range: TimeRange,
    /// Days the entry recurs on.
    pub weekdays: WeekdaySet,
    /// Set by the store on insert.
    pub created_at: DateTime<Utc>,
    /// Set by the store on insert and every update.
    pub updated_at: DateTime<Utc>,
}

impl TimetableEntry {
    /// Materialize a new entry from validated fields.
    pub fn from_fields(id: EntryId, owner_id: UserId, fields: EntryFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            class_id: fields.class_id,
            room: fields.room,
            subject: fields.subject,
            time_range: fields.time_range,
            weekdays: fields.weekdays,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field, keeping id, owner and creation time.
    pub fn apply(&mut self, fields: EntryFields, now: DateTime<Utc>) {
        self.class_id = fields.class_id;
        self.room = fields.room;
        self.subject = fields.subject;
        self.time_range = fields.time_range;
        self.weekdays = fields.weekdays;
        self.updated_at = now;
    }

    /// The recurring part used for conflict checks.
    pub const fn slot(&self) -> Slot {
        Slot {
            range: self.time_range,
            weekdays: self.weekdays,
        }
    }

    /// Ordering used by listings: class, then start time, then id.
    pub fn listing_order(&self, other: &Self) -> Ordering {
        self.class_id
            .cmp(&other.class_id)
            .then_with(|| self.time_range.start().cmp(&other.time_range.start()))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Raw write candidate as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    /// Student cohort label.
    pub class_id: Option<String>,
    /// Physical room label.
    pub room: Option<String>,
    /// Subject taught.
    pub subject: Option<String>,
    /// Start time, `HH:MM` or `HH:MM:SS`.
    pub start: Option<String>,
    /// End time, `HH:MM` or `HH:MM:SS`.
    pub end: Option<String>,
    /// Active weekdays.
    #[serde(default)]
    pub weekdays: WeekdaySet,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl EntryDraft {
    /// Convenience constructor with every field present.
    pub fn new(
        class_id: impl Into<String>,
        room: impl Into<String>,
        subject: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        weekdays: WeekdaySet,
    ) -> Self {
        Self {
            class_id: Some(class_id.into()),
            room: Some(room.into()),
            subject: Some(subject.into()),
            start: Some(start.into()),
            end: Some(end.into()),
            weekdays,
        }
    }

    /// Check presence of every field, then normalize times and weekdays.
    pub fn validate(&self) -> Result<EntryFields, ScheduleError> {
        let class_id = present(self.class_id.as_ref());
        let room = present(self.room.as_ref());
        let subject = present(self.subject.as_ref());
        let start = present(self.start.as_ref());
        let end = present(self.end.as_ref());

        let missing: Vec<&'static str> = [
            ("class_id", class_id.is_none()),
            ("room", room.is_none()),
            ("subject", subject.is_none()),
            ("start", start.is_none()),
            ("end", end.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (class_id, room, subject, start, end) {
            (Some(class_id), Some(room), Some(subject), Some(start), Some(end)) => {
                let slot = normalize(start, end, self.weekdays)?;
                Ok(EntryFields {
                    class_id: class_id.to_string(),
                    room: room.to_string(),
                    subject: subject.to_string(),
                    time_range: slot.range,
                    weekdays: slot.weekdays,
                })
            }
            _ => Err(ScheduleError::MissingFields(missing)),
        }
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct EntryPatch {
    /// New class label.
    #[serde(default, alias = "class")]
    pub class_id: Option<String>,
    /// New room label.
    pub room: Option<String>,
    /// New subject.
    pub subject: Option<String>,
    /// New start time.
    #[serde(default, alias = "start_time", alias = "startTime")]
    pub start: Option<String>,
    /// New end time.
    #[serde(default, alias = "end_time", alias = "endTime")]
    pub end: Option<String>,
    /// Monday flag.
    pub monday: Option<bool>,
    /// Tuesday flag.
    pub tuesday: Option<bool>,
    /// Wednesday flag.
    pub wednesday: Option<bool>,
    /// Thursday flag.
    pub thursday: Option<bool>,
    /// Friday flag.
    pub friday: Option<bool>,
}

impl EntryPatch {
    const fn day(&self, day: Weekday) -> Option<bool> {
        match day {
            Weekday::Monday => self.monday,
            Weekday::Tuesday => self.tuesday,
            Weekday::Wednesday => self.wednesday,
            Weekday::Thursday => self.thursday,
            Weekday::Friday => self.friday,
        }
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.class_id.is_none()
            && self.room.is_none()
            && self.subject.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && Weekday::ALL.into_iter().all(|day| self.day(day).is_none())
    }

    /// Overlay the patch onto an existing entry, producing a full draft that
    /// still has to pass validation.
    pub fn merge_onto(&self, existing: &TimetableEntry) -> EntryDraft {
        let weekdays = Weekday::ALL.into_iter().fold(WeekdaySet::EMPTY, |set, day| {
            set.with(day, self.day(day).unwrap_or_else(|| existing.weekdays.contains(day)))
        });
        EntryDraft {
            class_id: Some(self.class_id.clone().unwrap_or_else(|| existing.class_id.clone())),
            room: Some(self.room.clone().unwrap_or_else(|| existing.room.clone())),
            subject: Some(self.subject.clone().unwrap_or_else(|| existing.subject.clone())),
            start: Some(
                self.start
                    .clone()
                    .unwrap_or_else(|| existing.time_range.start().format("%H:%M:%S").to_string()),
            ),
            end: Some(
                self.end
                    .clone()
                    .unwrap_or_else(|| existing.time_range.end().format("%H:%M:%S").to_string()),
            ),
            weekdays,
        }
    }
}

/// Listing filter applied by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Only entries of this class.
    pub class_id: Option<String>,
    /// Only entries active on this day.
    pub weekday: Option<Weekday>,
}

impl EntryFilter {
    /// Whether `entry` passes the filter.
    pub fn matches(&self, entry: &TimetableEntry) -> bool {
        self.class_id.as_ref().is_none_or(|class| *class == entry.class_id)
            && self.weekday.is_none_or(|day| entry.weekdays.contains(day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn stored(weekdays: WeekdaySet) -> TimetableEntry {
        let fields = EntryDraft::new("1A", "A201", "Matematikk", "08:15", "09:00", weekdays)
            .validate()
            .unwrap();
        TimetableEntry::from_fields(1, 10, fields, Utc::now())
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let draft = EntryDraft {
            class_id: Some("  ".into()),
            room: None,
            subject: Some("Norsk".into()),
            start: Some("08:00".into()),
            end: Some("09:00".into()),
            weekdays: WeekdaySet::of(&[Weekday::Monday]),
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            ScheduleError::MissingFields(vec!["class_id", "room"])
        );
    }

    #[test]
    fn labels_are_trimmed() {
        let fields = EntryDraft::new(" 1A ", "A201 ", "Norsk", "08:00", "09:00", WeekdaySet::of(&[Weekday::Friday]))
            .validate()
            .unwrap();
        assert_eq!(fields.class_id, "1A");
        assert_eq!(fields.room, "A201");
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(EntryPatch::default().is_empty());
        let patch = EntryPatch {
            friday: Some(false),
            ..EntryPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn merge_keeps_untouched_fields_and_days() {
        let existing = stored(WeekdaySet::of(&[Weekday::Monday, Weekday::Wednesday]));
        let patch = EntryPatch {
            room: Some("B102".into()),
            monday: Some(false),
            friday: Some(true),
            ..EntryPatch::default()
        };
        let fields = patch.merge_onto(&existing).validate().unwrap();
        assert_eq!(fields.class_id, "1A");
        assert_eq!(fields.room, "B102");
        assert_eq!(fields.time_range.start(), NaiveTime::from_hms_opt(8, 15, 0).unwrap());
        assert_eq!(
            fields.weekdays,
            WeekdaySet::of(&[Weekday::Wednesday, Weekday::Friday])
        );
    }

    #[test]
    fn merge_can_clear_every_day() {
        let existing = stored(WeekdaySet::of(&[Weekday::Monday]));
        let patch = EntryPatch {
            monday: Some(false),
            ..EntryPatch::default()
        };
        assert_eq!(
            patch.merge_onto(&existing).validate().unwrap_err(),
            ScheduleError::InvalidWeekdays
        );
    }

    #[test]
    fn filter_by_class_and_day() {
        let entry = stored(WeekdaySet::of(&[Weekday::Tuesday]));
        assert!(EntryFilter::default().matches(&entry));
        assert!(EntryFilter {
            class_id: Some("1A".into()),
            weekday: Some(Weekday::Tuesday),
        }
        .matches(&entry));
        assert!(!EntryFilter {
            class_id: Some("1B".into()),
            weekday: None,
        }
        .matches(&entry));
        assert!(!EntryFilter {
            class_id: None,
            weekday: Some(Weekday::Monday),
        }
        .matches(&entry));
    }
}
