//! The reconciliation step folding incoming records into the dataset.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dataset::Dataset;
use crate::freshness::FreshnessPolicy;
use crate::types::{CanonicalRecord, HistoryEntry};

/// Prefix of keys synthesized for records without a source id.
///
/// Source ids are numeric strings, so the prefix can never collide with a
/// real id; the uuid suffix keeps synthesized keys unique across merges,
/// which means an id-less record is appended again on every run rather than
/// ever matching history.
const NO_ID_PREFIX: &str = "__noid__";

/// Counts of reconciliation outcomes for one merge call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeMetrics {
    /// Rows left untouched because the existing entry was still fresh, plus
    /// stale entries whose tracked fields carried no change.
    pub kept: usize,
    /// Stale entries superseded by a changed observation.
    pub updated: usize,
    /// Records appended with no matching history.
    pub added: usize,
    /// Final row count of the merged dataset (rows, not unique ids).
    pub total: usize,
}

/// Accumulated metrics across the batches of one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSummary {
    pub kept: usize,
    pub updated: usize,
    pub added: usize,
    pub batches: usize,
    /// Row count after the most recent batch.
    pub total: usize,
}

impl MergeSummary {
    /// Folds one batch's metrics into the running totals.
    pub fn absorb(&mut self, metrics: &MergeMetrics) {
        self.kept += metrics.kept;
        self.updated += metrics.updated;
        self.added += metrics.added;
        self.batches += 1;
        self.total = metrics.total;
    }
}

/// The single authoritative reconciliation step.
///
/// The engine is a synchronous, side-effect-free transformation over
/// in-memory data: it performs no I/O and is the sole writer of status
/// transitions. It never fails on malformed input; upstream translation has
/// already normalized unparseable values to null.
#[derive(Debug)]
pub struct MergeEngine<P> {
    policy: P,
}

impl<P: FreshnessPolicy> MergeEngine<P> {
    pub fn new(policy: P) -> MergeEngine<P> {
        MergeEngine { policy }
    }

    /// Merges a batch of incoming records, using the current time as the
    /// freshness reference.
    pub fn merge(&self, dataset: &mut Dataset, incoming: &[CanonicalRecord]) -> MergeMetrics {
        self.merge_at(dataset, incoming, Utc::now())
    }

    /// Merges a batch of incoming records against an explicit reference time.
    ///
    /// Records are processed in input order. Per record:
    /// - no usable id: appended unconditionally under a synthesized key;
    /// - unknown id: appended as a new active row;
    /// - known id with a fresh active row: the incoming record is discarded;
    /// - known id with a stale active row: superseded and replaced if any
    ///   tracked field differs, otherwise kept with its capture timestamp
    ///   refreshed so the row is accounted for without duplicating it.
    pub fn merge_at(
        &self,
        dataset: &mut Dataset,
        incoming: &[CanonicalRecord],
        reference: DateTime<Utc>,
    ) -> MergeMetrics {
        let mut metrics = MergeMetrics::default();

        for record in incoming {
            let id = match record.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    dataset.insert_active(HistoryEntry::from_record(phantom_key(), record));
                    metrics.added += 1;
                    continue;
                }
            };

            match dataset.active_entry(&id) {
                None => {
                    // Either a brand-new id or one whose history is fully
                    // superseded; both append a fresh active snapshot.
                    dataset.insert_active(HistoryEntry::from_record(id, record));
                    metrics.added += 1;
                }
                Some(active) => {
                    if self.policy.is_fresh(active, reference) {
                        metrics.kept += 1;
                    } else if active.fields.tracked_differs(&record.fields) {
                        dataset.supersede_active(&id);
                        dataset.insert_active(HistoryEntry::from_record(id, record));
                        metrics.updated += 1;
                    } else {
                        dataset.refresh_active(&id, record.captured_at);
                        metrics.kept += 1;
                    }
                }
            }
        }

        metrics.total = dataset.len();
        metrics
    }
}

fn phantom_key() -> String {
    format!("{NO_ID_PREFIX}{}", Uuid::new_v4().simple())
}
