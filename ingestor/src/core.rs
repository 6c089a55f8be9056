//! Component wiring for one ingestion run.

use std::time::Duration;

use anyhow::Context;
use catalog::freshness::DaysWindow;
use catalog::merge::MergeEngine;
use catalog::pipeline::{Pipeline, PipelineConfig};
use catalog::source::http::{HttpPageSource, HttpSourceConfig};
use catalog::source::json_file::JsonDirSource;
use catalog::source::BatchSource;
use catalog::store::csv::CsvStore;
use catalog::store::memory::MemoryStore;
use catalog::store::postgres::PostgresStore;
use catalog::store::DatasetStore;
use catalog::translate::SourceTranslator;
use tracing::info;

use crate::config::{IngestorConfig, MergeConfig, SourceConfig, StoreConfig};

/// Builds the configured components and runs the pipeline.
///
/// Dispatch over the store and source variants is static; each combination
/// monomorphizes its own pipeline.
pub async fn start_ingestor(config: IngestorConfig) -> anyhow::Result<()> {
    let IngestorConfig {
        source,
        store,
        merge,
    } = config;

    match store {
        StoreConfig::Memory => run_with_store(source, merge, MemoryStore::new()).await,
        StoreConfig::CsvFile { path } => {
            info!(path = %path.display(), "using flat-file dataset store");
            run_with_store(source, merge, CsvStore::new(path)).await
        }
        StoreConfig::Postgres {
            connection,
            procedure,
        } => {
            info!(
                procedure = %procedure,
                "using relational store; merge decisions run in the upsert procedure"
            );
            let store = PostgresStore::new(connection, procedure, merge.fresh_days);
            // The procedure applies the freshness window itself. A zero-day
            // in-process window makes the merge forward every incoming row
            // instead of filtering against (empty) local history.
            let merge = MergeConfig {
                fresh_days: 0,
                ..merge
            };
            run_with_store(source, merge, store).await
        }
    }
}

async fn run_with_store<D>(
    source: SourceConfig,
    merge: MergeConfig,
    store: D,
) -> anyhow::Result<()>
where
    D: DatasetStore + Sync,
{
    match source {
        SourceConfig::JsonDir { source, path } => {
            info!(source = %source, path = %path.display(), "reading batches from dump files");
            let batches = JsonDirSource::new(&path)
                .with_context(|| format!("failed to scan batch directory `{}`", path.display()))?;
            run_pipeline(batches, SourceTranslator::for_source(source), merge, store).await
        }
        SourceConfig::Http {
            source,
            base_url,
            user_agent,
            years,
            max_pages,
            pause_ms,
            retry_attempts,
            timeout_secs,
        } => {
            info!(source = %source, url = %base_url, "fetching batches over http");
            let batches = HttpPageSource::new(HttpSourceConfig {
                base_url,
                user_agent,
                years,
                max_pages,
                pause: Duration::from_millis(pause_ms),
                retry_attempts,
                timeout: Duration::from_secs(timeout_secs),
            })
            .context("failed to build the http source")?;
            run_pipeline(batches, SourceTranslator::for_source(source), merge, store).await
        }
    }
}

async fn run_pipeline<S, D>(
    batches: S,
    translator: SourceTranslator,
    merge: MergeConfig,
    store: D,
) -> anyhow::Result<()>
where
    S: BatchSource + Send,
    D: DatasetStore + Sync,
{
    let engine = MergeEngine::new(DaysWindow::new(merge.fresh_days));
    let pipeline = Pipeline::new(
        batches,
        translator,
        engine,
        store,
        PipelineConfig {
            checkpoint_each_batch: merge.checkpoint_each_batch,
        },
    );

    let summary = pipeline.run().await.context("ingestion run failed")?;
    info!(
        batches = summary.batches,
        kept = summary.kept,
        updated = summary.updated,
        added = summary.added,
        total = summary.total,
        "ingestion finished"
    );
    Ok(())
}
