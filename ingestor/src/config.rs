//! Ingestor configuration.
//!
//! Configuration is layered: `configuration/base.yaml` is always loaded, an
//! optional `configuration/{environment}.yaml` (selected by
//! `APP_ENVIRONMENT`, defaulting to `dev`) overrides it, and `APP_`-prefixed
//! environment variables override both, with `__` separating nested keys
//! (e.g. `APP_MERGE__FRESH_DAYS=3`).

use std::path::PathBuf;

use anyhow::Context;
use catalog::store::postgres::PgConnectionConfig;
use catalog::translate::SourceId;
use serde::Deserialize;

/// Directory containing configuration files relative to the working
/// directory.
const CONFIGURATION_DIR: &str = "configuration";

/// Environment variable selecting the configuration overlay.
const APP_ENVIRONMENT_ENV_NAME: &str = "APP_ENVIRONMENT";

const DEFAULT_ENVIRONMENT: &str = "dev";

/// Prefix and separators for environment variable overrides.
const ENV_PREFIX: &str = "APP";
const ENV_PREFIX_SEPARATOR: &str = "_";
const ENV_SEPARATOR: &str = "__";

/// Complete configuration for one ingestion run.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestorConfig {
    /// Where raw record batches come from.
    pub source: SourceConfig,
    /// Where the merged dataset is persisted.
    pub store: StoreConfig,
    /// Merge behavior.
    #[serde(default)]
    pub merge: MergeConfig,
}

/// Configuration for supported batch sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig {
    /// Batches read from JSON dump files in a directory, one batch per file.
    JsonDir {
        /// Which translator interprets the raw records.
        source: SourceId,
        path: PathBuf,
    },
    /// Paginated listing endpoint returning JSON arrays of raw records.
    Http {
        /// Which translator interprets the raw records.
        source: SourceId,
        /// Endpoint URL; may contain a `{year}` placeholder.
        base_url: String,
        #[serde(default = "default_user_agent")]
        user_agent: String,
        /// Model years iterated as separate batch scopes; requires a
        /// `{year}` placeholder in `base_url`. Defaults to 2015-2025; set to
        /// null for a single unscoped pass.
        #[serde(default = "default_target_years")]
        years: Option<Vec<i32>>,
        #[serde(default = "default_max_pages")]
        max_pages: u32,
        /// Pause between page requests, in milliseconds.
        #[serde(default = "default_pause_ms")]
        pause_ms: u64,
        #[serde(default = "default_retry_attempts")]
        retry_attempts: u32,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

/// Configuration for supported dataset stores.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store; useful for dry runs.
    Memory,
    /// Flat-file CSV table.
    CsvFile { path: PathBuf },
    /// Relational store upserting through a stored procedure. Selecting this
    /// moves the freshness/change decision into the database.
    Postgres {
        connection: PgConnectionConfig,
        #[serde(default = "default_procedure")]
        procedure: String,
    },
}

/// Merge behavior knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    /// Validity window in days; an entry younger than this is kept as-is.
    /// Zero disables freshness entirely (everything is reconsidered).
    #[serde(default = "default_fresh_days")]
    pub fresh_days: i64,
    /// Persist the dataset after every batch instead of once at the end.
    #[serde(default = "default_checkpoint")]
    pub checkpoint_each_batch: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            fresh_days: default_fresh_days(),
            checkpoint_each_batch: default_checkpoint(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; catalog-ingestor/0.1)".to_string()
}

fn default_target_years() -> Option<Vec<i32>> {
    Some((2015..=2025).collect())
}

fn default_max_pages() -> u32 {
    200
}

fn default_pause_ms() -> u64 {
    2_000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_procedure() -> String {
    catalog::store::postgres::DEFAULT_PROCEDURE.to_string()
}

fn default_fresh_days() -> i64 {
    1
}

fn default_checkpoint() -> bool {
    true
}

/// Loads the layered configuration.
pub fn load_config() -> anyhow::Result<IngestorConfig> {
    let directory = std::env::current_dir()
        .context("failed to determine the current directory")?
        .join(CONFIGURATION_DIR);
    let environment = std::env::var(APP_ENVIRONMENT_ENV_NAME)
        .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());

    let base_file = directory.join("base");
    let environment_file = directory.join(&environment);

    let settings = config::Config::builder()
        .add_source(config::File::with_name(&base_file.display().to_string()).required(true))
        .add_source(
            config::File::with_name(&environment_file.display().to_string()).required(false),
        )
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_PREFIX_SEPARATOR)
                .separator(ENV_SEPARATOR),
        )
        .build()
        .context("failed to load configuration")?;

    settings
        .try_deserialize::<IngestorConfig>()
        .context("failed to deserialize configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(yaml: &str) -> IngestorConfig {
        config::Config::builder()
            .add_source(config::File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn json_dir_source_with_csv_store_parses() {
        let config = parse(
            r#"
source:
  json_dir:
    source: patiotuerca
    path: "./batches"
store:
  csv_file:
    path: "./data/listings.csv"
"#,
        );
        assert!(matches!(
            config.source,
            SourceConfig::JsonDir {
                source: SourceId::PatioTuerca,
                ..
            }
        ));
        assert!(matches!(config.store, StoreConfig::CsvFile { .. }));
        assert_eq!(config.merge.fresh_days, 1);
        assert!(config.merge.checkpoint_each_batch);
    }

    #[test]
    fn http_source_defaults_apply() {
        let config = parse(
            r#"
source:
  http:
    source: autocor
    base_url: "https://example.test/api/vehicles?year={year}"
store: memory
"#,
        );
        let SourceConfig::Http {
            years,
            max_pages,
            retry_attempts,
            ..
        } = config.source
        else {
            panic!("expected http source");
        };
        assert_eq!(years, Some((2015..=2025).collect()));
        assert_eq!(max_pages, 200);
        assert_eq!(retry_attempts, 3);
    }

    #[test]
    fn postgres_store_parses_with_default_procedure() {
        let config = parse(
            r#"
source:
  json_dir:
    source: autocor
    path: "./batches"
store:
  postgres:
    connection:
      host: "localhost"
      port: 5432
      name: "catalog"
      username: "ingestor"
      password: "secret"
merge:
  fresh_days: 3
"#,
        );
        let StoreConfig::Postgres { procedure, .. } = config.store else {
            panic!("expected postgres store");
        };
        assert_eq!(procedure, catalog::store::postgres::DEFAULT_PROCEDURE);
        assert_eq!(config.merge.fresh_days, 3);
    }
}
