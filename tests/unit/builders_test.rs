//! Tests for building the service from configuration

use timeplan::builders::{build_service, open_store};
use timeplan::config::{ScopeLockPolicy, ServiceConfig, StoreBackendConfig};
use timeplan::core::{Caller, EntryDraft, Isolation, TimetableStore, Weekday, WeekdaySet};
use timeplan::infra::AnyStore;

fn monday(class: &str, room: &str) -> EntryDraft {
    EntryDraft::new(class, room, "Norsk", "08:00", "09:00", WeekdaySet::of(&[Weekday::Monday]))
}

#[tokio::test]
async fn test_default_build_uses_memory_store_and_audit_buffer() {
    let built = build_service(&ServiceConfig::default()).unwrap();
    assert!(matches!(built.service.store(), AnyStore::InMemory(_)));
    assert!(!built.service.uses_scope_locks());

    built
        .service
        .create_entry(&Caller::teacher(1), &monday("1A", "A301"))
        .await
        .unwrap();
    let log = built.audit_log.expect("audit buffer configured");
    assert_eq!(log.lock().events().len(), 1);
}

#[tokio::test]
async fn test_always_policy_forces_scope_locks() {
    let cfg = ServiceConfig {
        scope_locks: ScopeLockPolicy::Always,
        audit_capacity: 0,
        ..ServiceConfig::default()
    };
    let built = build_service(&cfg).unwrap();
    assert!(built.service.uses_scope_locks());
    assert!(built.audit_log.is_none());
}

#[tokio::test]
async fn test_journal_build_opens_store_on_disk() {
    let dir = std::env::temp_dir().join(format!("timeplan-build-{}", uuid::Uuid::new_v4()));
    let cfg = ServiceConfig {
        store: StoreBackendConfig::Journal,
        data_dir: Some(dir.clone()),
        ..ServiceConfig::default()
    };
    let store = open_store(&cfg).unwrap();
    assert_eq!(store.isolation(), Isolation::None);

    let built = build_service(&cfg).unwrap();
    assert!(built.service.uses_scope_locks());
    built
        .service
        .create_entry(&Caller::teacher(1), &monday("1A", "A301"))
        .await
        .unwrap();
    assert!(dir.join("timetable.jsonl").exists());

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_invalid_config_is_rejected() {
    let cfg = ServiceConfig {
        store: StoreBackendConfig::Journal,
        ..ServiceConfig::default()
    };
    let err = build_service(&cfg).err().expect("journal without data_dir");
    assert!(err.to_string().contains("config invalid"));
}
