//! API surface for transports.

pub mod api;

pub use api::{
    create_entry, delete_entry, get_entry, health, list_entries, update_entry, CreateEntryRequest,
    EntryView, ErrorBody, ListQuery, UpdateEntryRequest,
};
