//! Configuration models for the store backend, locking and audit.

pub mod service;

pub use service::{ScopeLockPolicy, ServiceConfig, StoreBackendConfig};
