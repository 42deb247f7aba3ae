//! Builders to construct the schedule service from configuration.

pub mod service_builder;

pub use service_builder::{build_service, open_store, BuiltService};
