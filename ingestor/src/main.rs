//! Catalog ingestor binary.
//!
//! Loads configuration, initializes tracing and runs one ingestion pass:
//! fetch batches from the configured source, translate them, merge them into
//! the persisted dataset and checkpoint after every batch.

use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod core;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load_config()?;

    init_tracing();
    info!("starting catalog ingestor");

    core::start_ingestor(config).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
