//! In-memory dataset store for tests and development.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::dataset::Dataset;
use crate::error::CatalogResult;

#[derive(Debug, Default)]
struct Inner {
    dataset: Dataset,
    saves: usize,
}

/// Stores the dataset in memory, losing it when the process exits.
///
/// Cloning is cheap and all clones share state, so a test can hand the store
/// to a pipeline and inspect what was persisted afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Creates a store pre-seeded with an existing dataset.
    pub fn with_dataset(dataset: Dataset) -> MemoryStore {
        MemoryStore {
            inner: Arc::new(Mutex::new(Inner { dataset, saves: 0 })),
        }
    }

    /// Snapshot of the currently persisted dataset.
    pub async fn snapshot(&self) -> Dataset {
        self.inner.lock().await.dataset.clone()
    }

    /// Number of times `save` has been called.
    pub async fn save_count(&self) -> usize {
        self.inner.lock().await.saves
    }
}

impl super::DatasetStore for MemoryStore {
    async fn load(&self) -> CatalogResult<Dataset> {
        Ok(self.inner.lock().await.dataset.clone())
    }

    async fn save(&self, dataset: &Dataset) -> CatalogResult<()> {
        let mut inner = self.inner.lock().await;
        inner.dataset = dataset.clone();
        inner.saves += 1;
        Ok(())
    }
}
