//! Structured logging setup.

/// Install a `fmt` subscriber filtered by `RUST_LOG`, unless the host has
/// already installed its own.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .try_init();
}
