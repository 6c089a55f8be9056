//! Dataset persistence backends.
//!
//! All backends implement [`DatasetStore`]; the merge engine and pipeline
//! never branch on the backend type. The relational backend is an explicitly
//! chosen alternate execution path that moves the freshness/change decision
//! into a stored procedure (see [`postgres::PostgresStore`]).

use std::future::Future;

use crate::dataset::Dataset;
use crate::error::CatalogResult;

pub mod csv;
pub mod memory;
pub mod postgres;

/// Loads and persists the keyed dataset.
///
/// `load` returns an empty dataset when no prior state exists. `save`
/// persists the full table; a failed save must leave the caller's in-memory
/// dataset untouched so the save can be retried without re-running the
/// merge.
pub trait DatasetStore {
    fn load(&self) -> impl Future<Output = CatalogResult<Dataset>> + Send;

    fn save(&self, dataset: &Dataset) -> impl Future<Output = CatalogResult<()>> + Send;
}
