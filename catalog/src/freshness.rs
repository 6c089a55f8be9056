//! Validity-window policies deciding whether a stored entry is still current.

use chrono::{DateTime, Duration, Utc};

use crate::types::HistoryEntry;

/// Decides whether a stored entry is still valid and therefore exempt from
/// replacement.
///
/// Implementations are pure and stateless; the merge engine is agnostic to
/// the windowing unit. An entry with no usable `ingested_at` must never be
/// reported fresh, failing toward re-ingestion rather than silently trusting
/// stale data.
pub trait FreshnessPolicy: Send + Sync {
    /// Returns whether `entry` is fresh relative to `reference`.
    fn is_fresh(&self, entry: &HistoryEntry, reference: DateTime<Utc>) -> bool;
}

/// Day-granularity validity window.
///
/// A window of zero or negative days means nothing is ever fresh.
#[derive(Debug, Clone, Copy)]
pub struct DaysWindow {
    days: i64,
}

impl DaysWindow {
    pub fn new(days: i64) -> DaysWindow {
        DaysWindow { days }
    }
}

impl FreshnessPolicy for DaysWindow {
    fn is_fresh(&self, entry: &HistoryEntry, reference: DateTime<Utc>) -> bool {
        if self.days <= 0 {
            return false;
        }
        match entry.ingested_at {
            Some(ingested_at) => reference - ingested_at < Duration::days(self.days),
            None => false,
        }
    }
}

/// Hour-granularity validity window, for sources that churn within a day.
#[derive(Debug, Clone, Copy)]
pub struct HoursWindow {
    hours: i64,
}

impl HoursWindow {
    pub fn new(hours: i64) -> HoursWindow {
        HoursWindow { hours }
    }
}

impl FreshnessPolicy for HoursWindow {
    fn is_fresh(&self, entry: &HistoryEntry, reference: DateTime<Utc>) -> bool {
        if self.hours <= 0 {
            return false;
        }
        match entry.ingested_at {
            Some(ingested_at) => reference - ingested_at < Duration::hours(self.hours),
            None => false,
        }
    }
}
