//! Core data types shared across translation, merging and persistence.

mod history;
mod record;

pub use history::{EntryStatus, HistoryEntry};
pub use record::{CanonicalRecord, ListingFields, Transmission};
