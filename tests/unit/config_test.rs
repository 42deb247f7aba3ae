//! Tests for configuration validation

use std::collections::HashMap;
use std::path::PathBuf;

use timeplan::config::{ScopeLockPolicy, ServiceConfig, StoreBackendConfig};

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_default_config_is_valid() {
    let cfg = ServiceConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.store, StoreBackendConfig::InMemory);
    assert_eq!(cfg.scope_locks, ScopeLockPolicy::Auto);
}

#[test]
fn test_journal_requires_data_dir() {
    let cfg = ServiceConfig {
        store: StoreBackendConfig::Journal,
        ..ServiceConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = ServiceConfig {
        data_dir: Some(PathBuf::from("/var/lib/timeplan")),
        ..cfg
    };
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_journal_name_must_be_a_plain_stem() {
    let cfg = ServiceConfig {
        journal_name: "../escape".into(),
        ..ServiceConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = ServiceConfig {
        journal_name: "  ".into(),
        ..ServiceConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "store": "journal",
        "data_dir": "/tmp/timeplan",
        "scope_locks": "always",
        "audit_capacity": 16
    }"#;
    let cfg = ServiceConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.store, StoreBackendConfig::Journal);
    assert_eq!(cfg.journal_name, "timetable");
    assert_eq!(cfg.scope_locks, ScopeLockPolicy::Always);
    assert_eq!(cfg.audit_capacity, 16);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(ServiceConfig::from_json_str(r#"{"store": "journal"}"#).is_err());
    assert!(ServiceConfig::from_json_str(r#"{"store": "postgres"}"#).is_err());
    assert!(ServiceConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_variables() {
    let env = vars(&[
        ("TIMEPLAN_STORE", "journal"),
        ("TIMEPLAN_DATA_DIR", "/srv/timeplan"),
        ("TIMEPLAN_JOURNAL", "school"),
        ("TIMEPLAN_SCOPE_LOCKS", "Always"),
        ("TIMEPLAN_AUDIT_CAPACITY", "0"),
    ]);
    let cfg = ServiceConfig::from_lookup(|key| env.get(key).cloned()).unwrap();
    assert_eq!(cfg.store, StoreBackendConfig::Journal);
    assert_eq!(cfg.data_dir, Some(PathBuf::from("/srv/timeplan")));
    assert_eq!(cfg.journal_name, "school");
    assert_eq!(cfg.scope_locks, ScopeLockPolicy::Always);
    assert_eq!(cfg.audit_capacity, 0);
}

#[test]
fn test_config_from_variables_rejects_garbage() {
    let env = vars(&[("TIMEPLAN_AUDIT_CAPACITY", "lots")]);
    assert!(ServiceConfig::from_lookup(|key| env.get(key).cloned()).is_err());

    let env = vars(&[("TIMEPLAN_SCOPE_LOCKS", "sometimes")]);
    assert!(ServiceConfig::from_lookup(|key| env.get(key).cloned()).is_err());
}

#[test]
fn test_unset_variables_keep_defaults() {
    let cfg = ServiceConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg, ServiceConfig::default());
}
