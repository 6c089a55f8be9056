//! Persisted history rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::record::{CanonicalRecord, ListingFields};

/// Lifecycle flag marking the one current snapshot per identifier versus
/// superseded history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Active,
    Inactive,
}

impl EntryStatus {
    /// Returns the persisted cell value for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Active => "active",
            EntryStatus::Inactive => "inactive",
        }
    }

    /// Parses a persisted cell value. Unrecognized values load as inactive so
    /// a corrupt status can never produce a second active snapshot.
    pub fn from_cell(cell: &str) -> EntryStatus {
        match cell {
            "active" => EntryStatus::Active,
            _ => EntryStatus::Inactive,
        }
    }
}

/// One persisted snapshot of a listing.
///
/// Multiple entries may share an `id`; at most one of them is
/// [`EntryStatus::Active`] at any time. An entry is mutated only by the merge
/// engine: its status flips to inactive when superseded, and its
/// `ingested_at` is refreshed when a stale observation carries no tracked
/// change. Field values are otherwise immutable and entries are never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Real source id, or a synthesized `__noid__` key for records without one.
    pub id: String,
    pub status: EntryStatus,
    /// Capture time of this snapshot. `None` when the persisted timestamp
    /// failed to parse; such entries are never considered fresh.
    pub ingested_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: ListingFields,
    /// Serialized raw payload as persisted alongside the canonical columns.
    pub raw: Option<String>,
}

impl HistoryEntry {
    /// Creates the active entry for a newly merged record.
    pub fn from_record(id: String, record: &CanonicalRecord) -> HistoryEntry {
        HistoryEntry {
            id,
            status: EntryStatus::Active,
            ingested_at: Some(record.captured_at),
            fields: record.fields.clone(),
            raw: Some(record.raw.to_string()),
        }
    }
}
