//! Service configuration structures.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory table; contents are lost on exit.
    #[default]
    InMemory,
    /// JSON-lines journal under `data_dir`.
    Journal,
}

impl FromStr for StoreBackendConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(Self::InMemory),
            "journal" | "file" => Ok(Self::Journal),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

/// When writes serialize through per-class and per-room locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLockPolicy {
    /// Only when the store does not isolate transactions.
    #[default]
    Auto,
    /// On every write.
    Always,
}

impl FromStr for ScopeLockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            other => Err(format!("unknown scope lock policy `{other}`")),
        }
    }
}

fn default_journal_name() -> String {
    "timetable".into()
}

const fn default_audit_capacity() -> usize {
    1024
}

/// Root service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Store backend selection.
    #[serde(default)]
    pub store: StoreBackendConfig,
    /// Directory holding the journal; required for the journal backend.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Journal file stem.
    #[serde(default = "default_journal_name")]
    pub journal_name: String,
    /// Scope-lock policy.
    #[serde(default)]
    pub scope_locks: ScopeLockPolicy,
    /// Audit events kept in memory; 0 logs them instead.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store: StoreBackendConfig::default(),
            data_dir: None,
            journal_name: default_journal_name(),
            scope_locks: ScopeLockPolicy::default(),
            audit_capacity: default_audit_capacity(),
        }
    }
}

impl ServiceConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.store == StoreBackendConfig::Journal && self.data_dir.is_none() {
            return Err("data_dir is required for the journal store".into());
        }
        let name = self.journal_name.trim();
        if name.is_empty() {
            return Err("journal_name must not be empty".into());
        }
        if name.contains(['/', '\\']) {
            return Err(format!("journal_name `{name}` must not contain path separators"));
        }
        Ok(())
    }

    /// Parse service configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `TIMEPLAN_*` variables, loading `.env` first
    /// if present. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut cfg = Self::default();
        if let Some(raw) = lookup("TIMEPLAN_STORE") {
            cfg.store = raw.parse()?;
        }
        if let Some(raw) = lookup("TIMEPLAN_DATA_DIR") {
            cfg.data_dir = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("TIMEPLAN_JOURNAL") {
            cfg.journal_name = raw.trim().to_string();
        }
        if let Some(raw) = lookup("TIMEPLAN_SCOPE_LOCKS") {
            cfg.scope_locks = raw.parse()?;
        }
        if let Some(raw) = lookup("TIMEPLAN_AUDIT_CAPACITY") {
            cfg.audit_capacity = raw
                .trim()
                .parse()
                .map_err(|e| format!("TIMEPLAN_AUDIT_CAPACITY invalid: {e}"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
