//! Error types for catalog operations.
//!
//! Data-quality problems are never errors: malformed numeric or date text is
//! normalized to null during translation, and unparseable cells loaded from a
//! persisted dataset degrade to null rather than failing the load. The
//! variants here cover collaborator I/O only.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while loading, fetching or persisting datasets.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Filesystem error while reading or writing a flat-file dataset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error from the relational store.
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),

    /// HTTP error from a paginated record source.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error for raw payloads or upsert batches.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A source batch could not be fetched or persisted.
    ///
    /// Carries the batch label and the number of records that were being
    /// processed so a resumed run knows where it stopped. The in-memory
    /// dataset is left intact when this is returned from a save, so the save
    /// can be retried without re-running the merge.
    #[error("batch `{label}` failed ({records} records attempted): {source}")]
    Batch {
        label: String,
        records: usize,
        #[source]
        source: Box<CatalogError>,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Wraps an error with the batch it occurred in.
    pub fn in_batch(self, label: impl Into<String>, records: usize) -> Self {
        CatalogError::Batch {
            label: label.into(),
            records,
            source: Box::new(self),
        }
    }
}
