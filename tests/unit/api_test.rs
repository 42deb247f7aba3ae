//! Tests for the DTO-level API

use std::time::Instant;

use timeplan::core::{Caller, Remedy, ScheduleService};
use timeplan::infra::{InMemoryStore, StaticTokenGate};
use timeplan::runtime::api::{
    create_entry, delete_entry, get_entry, health, list_entries, update_entry, CreateEntryRequest,
    ListQuery, UpdateEntryRequest,
};

fn gate() -> StaticTokenGate {
    StaticTokenGate::new()
        .with_token("teacher", Caller::teacher(1))
        .with_token("student-1a", Caller::student(20, "1A"))
}

fn request(class: &str, room: &str, start: &str, end: &str) -> CreateEntryRequest {
    CreateEntryRequest {
        class_id: Some(class.into()),
        room: Some(room.into()),
        subject: Some("Matte".into()),
        start: Some(start.into()),
        end: Some(end.into()),
        monday: true,
        ..CreateEntryRequest::default()
    }
}

#[tokio::test]
async fn test_create_and_list_round_trip() {
    let gate = gate();
    let service = ScheduleService::new(InMemoryStore::new());

    let created = create_entry(&gate, &service, Some("Bearer teacher"), request("1A", "A301", "08:00", "09:00"))
        .await
        .unwrap();
    create_entry(&gate, &service, Some("teacher"), request("2B", "B102", "08:00", "09:00"))
        .await
        .unwrap();

    let views = list_entries(&gate, &service, Some("student-1a"), ListQuery::default())
        .await
        .unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].id, created.id);
    assert_eq!(views[0].start_time, "08:00:00");
    assert!(views[0].monday);
    assert!(!views[0].tuesday);

    let json = serde_json::to_value(&views[0]).unwrap();
    assert_eq!(json["class"], "1A");
    assert_eq!(json["teacherId"], 1);
    assert_eq!(json["endTime"], "09:00:00");
}

#[tokio::test]
async fn test_request_accepts_alternate_field_names() {
    let req: CreateEntryRequest = serde_json::from_str(
        r#"{"class": "3C", "room": "C1", "subject": "Kjemi",
            "start_time": "10:00", "endTime": "10:45", "friday": true}"#,
    )
    .unwrap();
    let service = ScheduleService::new(InMemoryStore::new());
    let created = create_entry(&gate(), &service, Some("teacher"), req).await.unwrap();

    let view = get_entry(&gate(), &service, Some("teacher"), created.id).await.unwrap();
    assert_eq!(view.class_id, "3C");
    assert!(view.friday);
}

#[tokio::test]
async fn test_update_accepts_alternate_field_names() {
    let gate = gate();
    let service = ScheduleService::new(InMemoryStore::new());
    let created = create_entry(&gate, &service, Some("teacher"), request("1A", "A1", "08:00", "09:00"))
        .await
        .unwrap();

    let req: UpdateEntryRequest = serde_json::from_str(
        r#"{"room": "B2", "startTime": "10:00", "endTime": "11:00"}"#,
    )
    .unwrap();
    update_entry(&gate, &service, Some("teacher"), created.id, req)
        .await
        .unwrap();
    let view = get_entry(&gate, &service, Some("teacher"), created.id).await.unwrap();
    assert_eq!(view.room, "B2");
    assert_eq!(view.start_time, "10:00:00");
    assert_eq!(view.end_time, "11:00:00");

    let req: UpdateEntryRequest = serde_json::from_str(r#"{"class": "2B"}"#).unwrap();
    assert!(!req.is_empty());
    update_entry(&gate, &service, Some("teacher"), created.id, req)
        .await
        .unwrap();
    let view = get_entry(&gate, &service, Some("teacher"), created.id).await.unwrap();
    assert_eq!(view.class_id, "2B");

    let req: UpdateEntryRequest =
        serde_json::from_str(r#"{"start_time": "12:00", "end_time": "12:45"}"#).unwrap();
    update_entry(&gate, &service, Some("teacher"), created.id, req)
        .await
        .unwrap();
    let view = get_entry(&gate, &service, Some("teacher"), created.id).await.unwrap();
    assert_eq!(view.start_time, "12:00:00");
}

#[tokio::test]
async fn test_errors_carry_status_and_conflict() {
    let gate = gate();
    let service = ScheduleService::new(InMemoryStore::new());
    let first = create_entry(&gate, &service, Some("teacher"), request("1A", "A301", "08:00", "09:00"))
        .await
        .unwrap();

    let err = create_entry(&gate, &service, Some("teacher"), request("1B", "A301", "08:30", "09:30"))
        .await
        .unwrap_err();
    assert_eq!(err.status, 409);
    assert_eq!(err.kind, "room_conflict");
    assert_eq!(err.conflicting, Some(first.id));
    assert_eq!(err.remedy, Remedy::PickAnotherSlot);

    let err = create_entry(&gate, &service, None, request("1C", "C1", "08:00", "09:00"))
        .await
        .unwrap_err();
    assert_eq!(err.status, 401);
    assert_eq!(err.kind, "unauthenticated");

    let err = create_entry(&gate, &service, Some("forged"), request("1C", "C1", "08:00", "09:00"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, "invalid_token");

    let err = create_entry(&gate, &service, Some("student-1a"), request("1C", "C1", "08:00", "09:00"))
        .await
        .unwrap_err();
    assert_eq!(err.status, 403);
}

#[tokio::test]
async fn test_update_and_delete_acknowledge() {
    let gate = gate();
    let service = ScheduleService::new(InMemoryStore::new());
    let created = create_entry(&gate, &service, Some("teacher"), request("1A", "A301", "08:00", "09:00"))
        .await
        .unwrap();

    let patch = UpdateEntryRequest {
        room: Some("B200".into()),
        ..UpdateEntryRequest::default()
    };
    update_entry(&gate, &service, Some("teacher"), created.id, patch)
        .await
        .unwrap();
    let view = get_entry(&gate, &service, Some("teacher"), created.id).await.unwrap();
    assert_eq!(view.room, "B200");

    let err = update_entry(&gate, &service, Some("teacher"), created.id, UpdateEntryRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, "empty_update");

    delete_entry(&gate, &service, Some("teacher"), created.id).await.unwrap();
    let err = delete_entry(&gate, &service, Some("teacher"), created.id)
        .await
        .unwrap_err();
    assert_eq!(err.status, 404);
}

#[tokio::test]
async fn test_list_rejects_unknown_day() {
    let service = ScheduleService::new(InMemoryStore::new());
    let query = ListQuery {
        class: None,
        day: Some("saturday".into()),
    };
    let err = list_entries(&gate(), &service, Some("teacher"), query)
        .await
        .unwrap_err();
    assert_eq!(err.status, 400);
}

#[test]
fn test_health() {
    let health = health(Instant::now());
    assert_eq!(health.status, "OK");
    assert!(health.uptime_secs >= 0.0);
}
