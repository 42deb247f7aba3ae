//! Shared utilities.

pub mod clock;
pub mod telemetry;

pub use clock::now;
pub use telemetry::init_tracing;
