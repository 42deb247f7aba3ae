//! Infrastructure adapters for storage backends and identity resolution.

pub mod auth;
pub mod store;

pub use auth::StaticTokenGate;
pub use store::{AnyStore, InMemoryStore, JournalStore};
