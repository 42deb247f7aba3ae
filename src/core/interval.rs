//! Time-of-day ranges, weekday flag sets, and the overlap predicates used by
//! conflict detection.
//!
//! Everything here is pure: no I/O, no shared state. A [`Slot`] is the part of
//! a timetable entry that recurs every week; two slots conflict when their
//! ranges overlap and they share at least one active weekday.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ScheduleError;

/// A school day. The timetable only models Monday through Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
}

impl Weekday {
    /// All school days in week order.
    pub const ALL: [Self; 5] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Lowercase English name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a weekday name is not one of the five school days.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown weekday `{0}`")]
pub struct ParseWeekdayError(String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.name() == wanted)
            .ok_or_else(|| ParseWeekdayError(s.to_string()))
    }
}

/// Set of weekdays on which an entry recurs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Weekday>", from = "Vec<Weekday>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Build from per-day flags, Monday first.
    pub const fn from_flags(
        monday: bool,
        tuesday: bool,
        wednesday: bool,
        thursday: bool,
        friday: bool,
    ) -> Self {
        let mut bits = 0;
        if monday {
            bits |= Weekday::Monday.bit();
        }
        if tuesday {
            bits |= Weekday::Tuesday.bit();
        }
        if wednesday {
            bits |= Weekday::Wednesday.bit();
        }
        if thursday {
            bits |= Weekday::Thursday.bit();
        }
        if friday {
            bits |= Weekday::Friday.bit();
        }
        Self(bits)
    }

    /// Set containing exactly the given days.
    pub fn of(days: &[Weekday]) -> Self {
        days.iter().copied().collect()
    }

    /// Whether `day` is active.
    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    /// Return a copy with `day` set or cleared.
    #[must_use]
    pub const fn with(self, day: Weekday, active: bool) -> Self {
        if active {
            Self(self.0 | day.bit())
        } else {
            Self(self.0 & !day.bit())
        }
    }

    /// Days active in both sets.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// True when no day is active.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of active days.
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Active days in week order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |set, day| set.with(day, true))
    }
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(days: Vec<Weekday>) -> Self {
        days.into_iter().collect()
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

/// A time-of-day interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Deserialize)]
struct RawRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TryFrom<RawRange> for TimeRange {
    type Error = ScheduleError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Build a range, rejecting zero-length and inverted ones.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ScheduleError> {
        if start >= end {
            return Err(ScheduleError::InvalidRange(format!(
                "start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from `HH:MM` or `HH:MM:SS` strings.
    pub fn parse(raw_start: &str, raw_end: &str) -> Result<Self, ScheduleError> {
        Self::new(parse_time_of_day(raw_start)?, parse_time_of_day(raw_end)?)
    }

    /// Inclusive start.
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Exclusive end.
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whole minutes covered by the range.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Parse a 24-hour time of day, accepting `HH:MM:SS` and `HH:MM`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ScheduleError::InvalidRange(format!("malformed time of day `{raw}`")))
}

/// The weekly recurring part of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Time of day.
    pub range: TimeRange,
    /// Days on which the range recurs.
    pub weekdays: WeekdaySet,
}

/// Validate raw inputs into a range and a non-empty weekday set.
///
/// Weekdays are checked first: an entry with no active day is rejected with
/// [`ScheduleError::InvalidWeekdays`] whatever its times look like.
pub fn normalize(
    raw_start: &str,
    raw_end: &str,
    flags: WeekdaySet,
) -> Result<Slot, ScheduleError> {
    if flags.is_empty() {
        return Err(ScheduleError::InvalidWeekdays);
    }
    let range = TimeRange::parse(raw_start, raw_end)?;
    Ok(Slot {
        range,
        weekdays: flags,
    })
}

/// Open-interval overlap; touching endpoints do not overlap.
pub fn overlaps(a: &TimeRange, b: &TimeRange) -> bool {
    a.start < b.end && b.start < a.end
}

/// True when the two sets have at least one day in common.
pub const fn shares_weekday(a: WeekdaySet, b: WeekdaySet) -> bool {
    !a.intersection(b).is_empty()
}

/// Two slots conflict when they overlap in time on a shared weekday.
pub fn conflicts(a: &Slot, b: &Slot) -> bool {
    overlaps(&a.range, &b.range) && shares_weekday(a.weekdays, b.weekdays)
}
