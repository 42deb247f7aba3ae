//! Tests for audit sink

use timeplan::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink, WriteStage};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(
        Some(3),
        1,
        AuditAction::Create,
        WriteStage::Committed,
        None,
    );

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].entry_id, Some(3));
    assert_eq!(events[0].action, AuditAction::Create);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    for entry in 1..=3 {
        sink.record(build_audit_event(
            Some(entry),
            1,
            AuditAction::Delete,
            WriteStage::Committed,
            None,
        ));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].entry_id, Some(2)); // First one popped
    assert_eq!(events[1].entry_id, Some(3));
}

#[test]
fn test_zero_capacity_sink_stores_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event(None, 1, AuditAction::Reject, WriteStage::Received, None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_event_ids_are_unique() {
    let a = build_audit_event(None, 1, AuditAction::Reject, WriteStage::Authorized, None);
    let b = build_audit_event(None, 1, AuditAction::Reject, WriteStage::Authorized, None);
    assert_ne!(a.event_id, b.event_id);
}

#[test]
fn test_audit_event_serializes_stage() {
    let event = build_audit_event(
        Some(9),
        2,
        AuditAction::Reject,
        WriteStage::Validated,
        Some("class_conflict".into()),
    );
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["stage"], "validated");
    assert_eq!(json["action"], "reject");
    assert_eq!(json["detail"], "class_conflict");
}
