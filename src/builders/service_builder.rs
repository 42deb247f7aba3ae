//! Builder to construct the schedule service from configuration.

use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;

use crate::config::{ServiceConfig, StoreBackendConfig};
use crate::core::audit::{AuditSink, InMemoryAuditSink, TracingAuditSink};
use crate::core::service::ScheduleService;
use crate::core::AppResult;
use crate::infra::store::{AnyStore, InMemoryStore, JournalStore};

/// A configured service plus the handles a host may want to keep.
pub struct BuiltService {
    /// The service itself.
    pub service: ScheduleService<AnyStore>,
    /// Readable audit buffer, when `audit_capacity > 0`.
    pub audit_log: Option<Arc<Mutex<InMemoryAuditSink>>>,
}

/// Open the configured store.
pub fn open_store(cfg: &ServiceConfig) -> AppResult<AnyStore> {
    match cfg.store {
        StoreBackendConfig::InMemory => Ok(InMemoryStore::new().into()),
        StoreBackendConfig::Journal => {
            let dir = cfg
                .data_dir
                .as_ref()
                .context("data_dir is required for the journal store")?;
            let store = JournalStore::open(dir, cfg.journal_name.trim())
                .with_context(|| format!("opening journal in {}", dir.display()))?;
            Ok(store.into())
        }
    }
}

/// Build a schedule service from configuration.
pub fn build_service(cfg: &ServiceConfig) -> AppResult<BuiltService> {
    cfg.validate()
        .map_err(|e| anyhow::anyhow!("config invalid: {e}"))?;

    let store = open_store(cfg)?;
    let mut audit_log = None;
    let sink: Box<dyn AuditSink> = if cfg.audit_capacity > 0 {
        let log = Arc::new(Mutex::new(InMemoryAuditSink::new(cfg.audit_capacity)));
        audit_log = Some(Arc::clone(&log));
        Box::new(log)
    } else {
        Box::new(TracingAuditSink)
    };

    let service = ScheduleService::new(store)
        .with_lock_policy(cfg.scope_locks)
        .with_audit(sink);
    tracing::info!(
        store = ?cfg.store,
        scope_locks = service.uses_scope_locks(),
        audit_capacity = cfg.audit_capacity,
        "schedule service built"
    );
    Ok(BuiltService { service, audit_log })
}
