//! API-facing request/response models and the calls a transport makes.
//!
//! Every call takes the raw credential as received, resolves it through an
//! [`AuthorizationGate`], and answers with serde DTOs. Failures come back as
//! an [`ErrorBody`] carrying the HTTP-style status the transport should use.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::auth::{AuthorizationGate, Caller};
use crate::core::entry::{EntryDraft, EntryId, EntryPatch, TimetableEntry, UserId};
use crate::core::interval::{Weekday, WeekdaySet};
use crate::core::service::ScheduleService;
use crate::core::store::TimetableStore;
use crate::core::{Remedy, ScheduleError};
use crate::util::clock::now;

/// Entry creation payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct CreateEntryRequest {
    /// Class label.
    #[serde(default, alias = "class")]
    pub class_id: Option<String>,
    /// Room label.
    #[serde(default)]
    pub room: Option<String>,
    /// Subject.
    #[serde(default)]
    pub subject: Option<String>,
    /// Start time, `HH:MM` or `HH:MM:SS`.
    #[serde(default, alias = "start_time", alias = "startTime")]
    pub start: Option<String>,
    /// End time, `HH:MM` or `HH:MM:SS`.
    #[serde(default, alias = "end_time", alias = "endTime")]
    pub end: Option<String>,
    /// Monday flag.
    #[serde(default)]
    pub monday: bool,
    /// Tuesday flag.
    #[serde(default)]
    pub tuesday: bool,
    /// Wednesday flag.
    #[serde(default)]
    pub wednesday: bool,
    /// Thursday flag.
    #[serde(default)]
    pub thursday: bool,
    /// Friday flag.
    #[serde(default)]
    pub friday: bool,
}

impl From<CreateEntryRequest> for EntryDraft {
    fn from(req: CreateEntryRequest) -> Self {
        Self {
            class_id: req.class_id,
            room: req.room,
            subject: req.subject,
            start: req.start,
            end: req.end,
            weekdays: WeekdaySet::from_flags(
                req.monday,
                req.tuesday,
                req.wednesday,
                req.thursday,
                req.friday,
            ),
        }
    }
}

/// Partial update payload; absent fields are left untouched.
pub type UpdateEntryRequest = EntryPatch;

/// Listing query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Class filter; ignored for students bound to a class.
    #[serde(default)]
    pub class: Option<String>,
    /// Weekday filter by lowercase English name.
    #[serde(default)]
    pub day: Option<String>,
}

/// Entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct EntryView {
    /// Entry id.
    pub id: EntryId,
    /// Teacher who created the entry.
    pub teacher_id: UserId,
    /// Class label.
    #[serde(rename = "class")]
    pub class_id: String,
    /// Start time, `HH:MM:SS`.
    pub start_time: String,
    /// End time, `HH:MM:SS`.
    pub end_time: String,
    /// Monday flag.
    pub monday: bool,
    /// Tuesday flag.
    pub tuesday: bool,
    /// Wednesday flag.
    pub wednesday: bool,
    /// Thursday flag.
    pub thursday: bool,
    /// Friday flag.
    pub friday: bool,
    /// Subject.
    pub subject: String,
    /// Room label.
    pub room: String,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl From<TimetableEntry> for EntryView {
    fn from(entry: TimetableEntry) -> Self {
        let day = |d| entry.weekdays.contains(d);
        Self {
            id: entry.id,
            teacher_id: entry.owner_id,
            start_time: entry.time_range.start().format("%H:%M:%S").to_string(),
            end_time: entry.time_range.end().format("%H:%M:%S").to_string(),
            monday: day(Weekday::Monday),
            tuesday: day(Weekday::Tuesday),
            wednesday: day(Weekday::Wednesday),
            thursday: day(Weekday::Thursday),
            friday: day(Weekday::Friday),
            class_id: entry.class_id,
            subject: entry.subject,
            room: entry.room,
            updated_at: entry.updated_at,
        }
    }
}

/// Creation acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    /// Id of the new entry.
    pub id: EntryId,
    /// Human-readable outcome.
    pub message: String,
}

/// Plain acknowledgement for updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Human-readable outcome.
    pub message: String,
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP-style status code.
    pub status: u16,
    /// Stable machine-readable kind.
    pub kind: String,
    /// Human-readable message.
    pub error: String,
    /// What the caller should do next.
    pub remedy: Remedy,
    /// Colliding entry for conflict rejections.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub conflicting: Option<EntryId>,
}

impl From<ScheduleError> for ErrorBody {
    fn from(err: ScheduleError) -> Self {
        // Store details stay in the logs.
        let error = match &err {
            ScheduleError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        Self {
            status: err.status_code(),
            kind: err.kind().to_string(),
            error,
            remedy: err.remedy(),
            conflicting: err.conflicting_entry(),
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Always `"OK"` while the process answers.
    pub status: String,
    /// Time of the probe.
    pub timestamp: DateTime<Utc>,
    /// Seconds since `started`.
    pub uptime_secs: f64,
}

async fn authenticate<G>(gate: &G, token: Option<&str>) -> Result<Caller, ErrorBody>
where
    G: AuthorizationGate + ?Sized,
{
    gate.resolve_caller(token).await.map_err(|err| {
        tracing::warn!(error = %err, "request not authenticated");
        ErrorBody::from(ScheduleError::from(err))
    })
}

/// Create an entry.
pub async fn create_entry<G, S>(
    gate: &G,
    service: &ScheduleService<S>,
    token: Option<&str>,
    req: CreateEntryRequest,
) -> Result<Created, ErrorBody>
where
    G: AuthorizationGate + ?Sized,
    S: TimetableStore,
{
    let caller = authenticate(gate, token).await?;
    let id = service.create_entry(&caller, &req.into()).await?;
    Ok(Created {
        id,
        message: "entry added".into(),
    })
}

/// Update an entry.
pub async fn update_entry<G, S>(
    gate: &G,
    service: &ScheduleService<S>,
    token: Option<&str>,
    id: EntryId,
    req: UpdateEntryRequest,
) -> Result<Ack, ErrorBody>
where
    G: AuthorizationGate + ?Sized,
    S: TimetableStore,
{
    let caller = authenticate(gate, token).await?;
    service.update_entry(&caller, id, &req).await?;
    Ok(Ack {
        message: "entry updated".into(),
    })
}

/// Delete an entry.
pub async fn delete_entry<G, S>(
    gate: &G,
    service: &ScheduleService<S>,
    token: Option<&str>,
    id: EntryId,
) -> Result<Ack, ErrorBody>
where
    G: AuthorizationGate + ?Sized,
    S: TimetableStore,
{
    let caller = authenticate(gate, token).await?;
    service.delete_entry(&caller, id).await?;
    Ok(Ack {
        message: "entry deleted".into(),
    })
}

/// List entries visible to the caller.
pub async fn list_entries<G, S>(
    gate: &G,
    service: &ScheduleService<S>,
    token: Option<&str>,
    query: ListQuery,
) -> Result<Vec<EntryView>, ErrorBody>
where
    G: AuthorizationGate + ?Sized,
    S: TimetableStore,
{
    let caller = authenticate(gate, token).await?;
    let weekday = query
        .day
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::parse::<Weekday>)
        .transpose()
        .map_err(|_| ScheduleError::InvalidWeekdays)?;
    let entries = service
        .list_entries(&caller, query.class.as_deref(), weekday)
        .await?;
    Ok(entries.into_iter().map(EntryView::from).collect())
}

/// Fetch one entry visible to the caller.
pub async fn get_entry<G, S>(
    gate: &G,
    service: &ScheduleService<S>,
    token: Option<&str>,
    id: EntryId,
) -> Result<EntryView, ErrorBody>
where
    G: AuthorizationGate + ?Sized,
    S: TimetableStore,
{
    let caller = authenticate(gate, token).await?;
    Ok(service.get_entry(&caller, id).await?.into())
}

/// Return a health payload.
pub fn health(started: Instant) -> Health {
    Health {
        status: "OK".into(),
        timestamp: now(),
        uptime_secs: started.elapsed().as_secs_f64(),
    }
}
