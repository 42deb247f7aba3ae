//! # Timeplan
//!
//! Weekly school timetable service built around a scheduling conflict engine.
//!
//! A timetable entry is a recurring slot: a class, a room and a subject on a
//! set of weekdays (Monday through Friday) during a time-of-day range. Two
//! entries conflict when they share a class or a room, share at least one
//! weekday, and their half-open time ranges overlap.
//!
//! ## Write path
//!
//! Every write goes through [`core::ScheduleService`]:
//!
//! 1. **Authorize**: only teachers may create, update or delete.
//! 2. **Validate**: required fields, weekday flags, then `start < end`.
//! 3. **Check conflicts**: class scope first, then room scope.
//! 4. **Commit**: inside the same store transaction as the check.
//!
//! Stores that do not isolate transactions get per-class and per-room
//! single-writer locks instead, so two concurrent conflicting writes can never
//! both commit.
//!
//! ## Example
//!
//! ```rust,no_run
//! use timeplan::core::{Caller, EntryDraft, ScheduleService, Weekday, WeekdaySet};
//! use timeplan::infra::InMemoryStore;
//!
//! # async fn demo() -> Result<(), timeplan::core::ScheduleError> {
//! let service = ScheduleService::new(InMemoryStore::new());
//! let teacher = Caller::teacher(1);
//! let draft = EntryDraft::new("1A", "A301", "Math", "08:00", "09:00", WeekdaySet::of(&[Weekday::Monday]));
//! let id = service.create_entry(&teacher, &draft).await?;
//! # let _ = id;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: interval model, conflict checker, service, store and gate traits
//! - [`infra`]: in-memory and journal stores, static token gate
//! - [`config`] / [`builders`]: configuration and service assembly
//! - [`runtime`]: DTO-level API for transports

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core timetable model, conflict detection and the schedule service.
pub mod core;
/// Configuration models for the store backend, locking and audit.
pub mod config;
/// Builders to construct the schedule service from configuration.
pub mod builders;
/// Infrastructure adapters for storage backends and identity resolution.
pub mod infra;
/// API surface for transports.
pub mod runtime;
/// Shared utilities.
pub mod util;
