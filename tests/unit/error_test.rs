//! Tests for error types

use timeplan::core::{Remedy, ScheduleError, StoreError};

#[test]
fn test_missing_fields_error() {
    let err = ScheduleError::MissingFields(vec!["room", "subject"]);
    assert_eq!(format!("{err}"), "missing required fields: room, subject");
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.remedy(), Remedy::FixInput);
}

#[test]
fn test_conflict_errors_name_the_colliding_entry() {
    let err = ScheduleError::ClassConflict { conflicting: Some(7) };
    assert_eq!(format!("{err}"), "time conflict detected with entry 7");
    assert_eq!(err.conflicting_entry(), Some(7));

    let err = ScheduleError::RoomConflict { conflicting: None };
    assert_eq!(format!("{err}"), "room is not available at this time");
    assert_eq!(err.status_code(), 409);
    assert_eq!(err.remedy(), Remedy::PickAnotherSlot);
}

#[test]
fn test_identity_errors() {
    assert_eq!(ScheduleError::Unauthenticated.status_code(), 401);
    assert_eq!(ScheduleError::InvalidToken.status_code(), 401);
    assert_eq!(ScheduleError::Forbidden.status_code(), 403);
    assert_eq!(ScheduleError::Forbidden.remedy(), Remedy::Authenticate);
}

#[test]
fn test_not_found_error() {
    let err = ScheduleError::NotFound(42);
    assert_eq!(format!("{err}"), "entry 42 not found");
    assert_eq!(err.kind(), "not_found");
    assert_eq!(err.remedy(), Remedy::NotFound);
}

#[test]
fn test_store_error_becomes_internal() {
    let err: ScheduleError = StoreError::Backend("connection failed".to_string()).into();
    assert_eq!(
        err,
        ScheduleError::Internal("store backend error: connection failed".to_string())
    );
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.remedy(), Remedy::RetryLater);
}
