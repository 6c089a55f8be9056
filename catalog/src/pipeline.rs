//! The sequential per-batch ingestion loop.

use tracing::{debug, info};

use crate::error::CatalogResult;
use crate::freshness::FreshnessPolicy;
use crate::merge::{MergeEngine, MergeSummary};
use crate::source::BatchSource;
use crate::store::DatasetStore;
use crate::translate::Translator;
use crate::types::CanonicalRecord;

/// Pipeline behavior knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Persist the dataset after every batch (recommended for long
    /// multi-batch runs: partial progress survives a crash). When false, a
    /// single save runs after the last batch.
    pub checkpoint_each_batch: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            checkpoint_each_batch: true,
        }
    }
}

/// Drives one ingestion run: the dataset is loaded once, mutated in memory
/// across all batches, and persisted per the checkpoint setting.
///
/// Batches are strictly sequential; the dataset is not designed for
/// concurrent mutation. A save failure aborts the run with the batch label
/// and record count in the error; stores never mutate the dataset they are
/// given, so checkpoints from earlier batches remain valid and the run can
/// be resumed from them.
pub struct Pipeline<S, T, P, D> {
    source: S,
    translator: T,
    engine: MergeEngine<P>,
    store: D,
    config: PipelineConfig,
}

impl<S, T, P, D> Pipeline<S, T, P, D>
where
    S: BatchSource + Send,
    T: Translator,
    P: FreshnessPolicy,
    D: DatasetStore + Sync,
{
    pub fn new(
        source: S,
        translator: T,
        engine: MergeEngine<P>,
        store: D,
        config: PipelineConfig,
    ) -> Self {
        Pipeline {
            source,
            translator,
            engine,
            store,
            config,
        }
    }

    /// Runs the pipeline to completion, returning the accumulated metrics.
    pub async fn run(mut self) -> CatalogResult<MergeSummary> {
        let mut dataset = self.store.load().await?;
        info!(rows = dataset.len(), "loaded existing dataset");

        let mut summary = MergeSummary::default();

        while let Some(batch) = self.source.next_batch().await? {
            let records: Vec<CanonicalRecord> = batch
                .records
                .iter()
                .map(|raw| self.translator.translate(raw))
                .collect();

            for record in &records {
                let gaps = record.gaps();
                if !gaps.is_empty() {
                    debug!(
                        id = record.id.as_deref().unwrap_or("<none>"),
                        missing = ?gaps,
                        "record has unresolved fields"
                    );
                }
            }

            let metrics = self.engine.merge(&mut dataset, &records);
            summary.absorb(&metrics);
            info!(
                batch = %batch.label,
                kept = metrics.kept,
                updated = metrics.updated,
                added = metrics.added,
                total = metrics.total,
                "batch merged"
            );

            if self.config.checkpoint_each_batch {
                self.store
                    .save(&dataset)
                    .await
                    .map_err(|error| error.in_batch(batch.label.as_str(), records.len()))?;
                debug!(batch = %batch.label, "checkpoint saved");
            }
        }

        if !self.config.checkpoint_each_batch {
            self.store
                .save(&dataset)
                .await
                .map_err(|error| error.in_batch("final", dataset.len()))?;
        }

        info!(
            batches = summary.batches,
            kept = summary.kept,
            updated = summary.updated,
            added = summary.added,
            total = summary.total,
            "run complete"
        );
        Ok(summary)
    }
}
