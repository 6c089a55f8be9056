//! The keyed, history-preserving dataset and its active-row index.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::types::{EntryStatus, HistoryEntry};

/// All persisted history rows plus an in-memory index of active snapshots.
///
/// Rows are append-only: superseding an entry flips its status in place and
/// appends the replacement. The index maps each id to the position of its
/// active row (`None` when every row for that id has been superseded) and is
/// rebuilt from row data whenever a dataset is loaded, the same way a merge
/// process rebuilds its primary-key index from existing table data on
/// startup.
///
/// Invariant: at most one active row per id. [`Dataset::from_rows`]
/// re-establishes it on load for legacy data that violates it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<HistoryEntry>,
    index: HashMap<String, Option<usize>>,
}

impl Dataset {
    pub fn new() -> Dataset {
        Dataset::default()
    }

    /// Rebuilds a dataset from persisted rows, restoring the index.
    ///
    /// If more than one active row exists for an id, the last one read wins
    /// and the earlier ones are demoted to inactive with a warning, so the
    /// merge precondition holds even for datasets written before the
    /// invariant was enforced.
    pub fn from_rows(rows: Vec<HistoryEntry>) -> Dataset {
        let mut dataset = Dataset {
            rows,
            index: HashMap::new(),
        };
        for position in 0..dataset.rows.len() {
            let id = dataset.rows[position].id.clone();
            let slot = dataset.index.entry(id.clone()).or_insert(None);
            if dataset.rows[position].status == EntryStatus::Active {
                if let Some(previous) = slot.replace(position) {
                    warn!(id = %id, "duplicate active rows for id, demoting earlier row");
                    dataset.rows[previous].status = EntryStatus::Inactive;
                }
            }
        }
        dataset
    }

    /// Total number of rows, counting superseded history.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns whether any row (active or not) carries this id.
    pub fn contains_id(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the active entry for an id, if one exists.
    pub fn active_entry(&self, id: &str) -> Option<&HistoryEntry> {
        let position = (*self.index.get(id)?)?;
        Some(&self.rows[position])
    }

    /// Appends a new entry and marks it as the active row for its id.
    ///
    /// The caller must have superseded any previously active row for the same
    /// id first; this is enforced in debug builds.
    pub fn insert_active(&mut self, entry: HistoryEntry) {
        debug_assert!(self.active_entry(&entry.id).is_none());
        let position = self.rows.len();
        self.index.insert(entry.id.clone(), Some(position));
        self.rows.push(entry);
    }

    /// Flips the active row for `id` to inactive, retaining it as history.
    ///
    /// Returns whether an active row existed.
    pub fn supersede_active(&mut self, id: &str) -> bool {
        match self.index.get_mut(id) {
            Some(slot) => match slot.take() {
                Some(position) => {
                    self.rows[position].status = EntryStatus::Inactive;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Refreshes the capture timestamp of the active row for `id`.
    ///
    /// Used when a stale observation carries no tracked change: the row is
    /// kept instead of duplicated, but its validity window restarts.
    pub fn refresh_active(&mut self, id: &str, ingested_at: DateTime<Utc>) -> bool {
        let Some(Some(position)) = self.index.get(id).copied() else {
            return false;
        };
        self.rows[position].ingested_at = Some(ingested_at);
        true
    }

    /// Iterates rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.rows.iter()
    }

    /// Rows sorted deterministically for persistence.
    ///
    /// Insertion order is not significant on reload, so every save re-sorts
    /// by id and capture time to keep output diff-stable across runs.
    pub fn ordered_rows(&self) -> Vec<&HistoryEntry> {
        let mut ordered: Vec<&HistoryEntry> = self.rows.iter().collect();
        ordered.sort_by(|a, b| {
            a.id.cmp(&b.id)
                .then_with(|| a.ingested_at.cmp(&b.ingested_at))
                .then_with(|| a.status.as_str().cmp(b.status.as_str()))
        });
        ordered
    }

    /// Number of active rows for an id; exposed for invariant tests.
    pub fn active_count(&self, id: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| row.id == id && row.status == EntryStatus::Active)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ListingFields;

    fn row(id: &str, status: EntryStatus) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            status,
            ingested_at: Some(Utc::now()),
            fields: ListingFields::default(),
            raw: None,
        }
    }

    #[test]
    fn from_rows_indexes_active_entries() {
        let dataset = Dataset::from_rows(vec![
            row("a", EntryStatus::Inactive),
            row("a", EntryStatus::Active),
            row("b", EntryStatus::Active),
        ]);
        assert_eq!(dataset.len(), 3);
        assert!(dataset.active_entry("a").is_some());
        assert!(dataset.contains_id("a"));
        assert_eq!(dataset.active_count("a"), 1);
    }

    #[test]
    fn from_rows_demotes_duplicate_active_rows() {
        let dataset = Dataset::from_rows(vec![
            row("a", EntryStatus::Active),
            row("a", EntryStatus::Active),
        ]);
        assert_eq!(dataset.active_count("a"), 1);
        // The later row wins.
        assert_eq!(dataset.iter().filter(|r| r.status == EntryStatus::Active).count(), 1);
    }

    #[test]
    fn supersede_retains_the_row_as_history() {
        let mut dataset = Dataset::from_rows(vec![row("a", EntryStatus::Active)]);
        assert!(dataset.supersede_active("a"));
        assert_eq!(dataset.len(), 1);
        assert!(dataset.active_entry("a").is_none());
        assert!(dataset.contains_id("a"));
        assert!(!dataset.supersede_active("a"));
    }

    #[test]
    fn ordered_rows_sorts_by_id_then_time() {
        let mut early = row("b", EntryStatus::Inactive);
        early.ingested_at = Some(Utc::now() - chrono::Duration::days(1));
        let late = row("b", EntryStatus::Active);
        let dataset = Dataset::from_rows(vec![late.clone(), row("a", EntryStatus::Active), early]);
        let ordered = dataset.ordered_rows();
        assert_eq!(ordered[0].id, "a");
        assert_eq!(ordered[1].id, "b");
        assert_eq!(ordered[1].status, EntryStatus::Inactive);
        assert_eq!(ordered[2].status, EntryStatus::Active);
    }
}
