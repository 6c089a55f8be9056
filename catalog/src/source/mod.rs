//! Sources of raw record batches.
//!
//! A batch is one bounded unit of incoming records (a page, a year, a dump
//! file) processed through one merge call. Sources yield batches in order
//! and never interleave; if parallel fetching is ever introduced, its
//! results must be serialized into a single ordered sequence before being
//! handed to the pipeline.

use std::future::Future;

use serde_json::Value;

use crate::error::CatalogResult;

pub mod http;
pub mod json_file;

/// One labeled batch of raw source records.
#[derive(Debug, Clone)]
pub struct RawBatch {
    /// Human-readable batch identifier (year, page or file stem), used in
    /// logs and error context so a failed run can be resumed.
    pub label: String,
    pub records: Vec<Value>,
}

/// Pull-based supplier of raw batches.
///
/// Returns `Ok(None)` when the source is exhausted. A fetch failure aborts
/// only the current run; previously checkpointed state remains valid.
pub trait BatchSource {
    fn next_batch(&mut self) -> impl Future<Output = CatalogResult<Option<RawBatch>>> + Send;
}
