//! Relational dataset store backed by a Postgres upsert procedure.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::dataset::Dataset;
use crate::error::CatalogResult;

/// Default upsert function invoked by [`PostgresStore::save`].
pub const DEFAULT_PROCEDURE: &str = "catalog_upsert_from_json";

const NUM_POOL_CONNECTIONS: u32 = 1;

/// Connection parameters for the relational store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PgConnectionConfig {
    /// Hostname or IP address of the Postgres server.
    pub host: String,
    /// Port the server listens on.
    pub port: u16,
    /// Database name.
    pub name: String,
    /// Username for authentication.
    pub username: String,
    /// Password; redacted in debug output.
    pub password: Option<SecretString>,
    /// Require full TLS verification instead of opportunistic TLS.
    #[serde(default)]
    pub require_tls: bool,
}

impl PgConnectionConfig {
    fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_tls {
            PgSslMode::VerifyFull
        } else {
            PgSslMode::Prefer
        };
        let mut options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.username)
            .ssl_mode(ssl_mode);
        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }
        options
    }
}

/// Dataset store that defers merging to the database.
///
/// This is the explicitly chosen alternate execution path: `save` serializes
/// the rows to a JSON array and hands them to an upsert function together
/// with the freshness window, so the kept/updated/inserted decision runs
/// inside the database and the in-process freshness policy is bypassed.
/// `load` correspondingly returns an empty dataset; the pipeline then merges
/// every batch against empty history, which forwards all incoming rows to
/// the procedure unfiltered.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    config: PgConnectionConfig,
    procedure: String,
    fresh_days: i64,
}

impl PostgresStore {
    pub fn new(config: PgConnectionConfig, procedure: String, fresh_days: i64) -> PostgresStore {
        PostgresStore {
            config,
            procedure,
            fresh_days,
        }
    }

    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(NUM_POOL_CONNECTIONS)
            .min_connections(NUM_POOL_CONNECTIONS)
            .connect_with(self.config.connect_options())
            .await
    }
}

impl super::DatasetStore for PostgresStore {
    async fn load(&self) -> CatalogResult<Dataset> {
        // The upsert procedure owns the reconciliation decision, so there is
        // no need to read prior state into memory.
        Ok(Dataset::new())
    }

    async fn save(&self, dataset: &Dataset) -> CatalogResult<()> {
        let payload = serde_json::to_string(&dataset.ordered_rows())?;

        let pool = self.connect().await?;
        let sql = format!(
            "SELECT kept, updated, inserted FROM {}($1::jsonb, $2)",
            self.procedure
        );
        let row = sqlx::query(&sql)
            .bind(&payload)
            .bind(self.fresh_days)
            .fetch_one(&pool)
            .await?;

        let kept: i64 = row.try_get("kept")?;
        let updated: i64 = row.try_get("updated")?;
        let inserted: i64 = row.try_get("inserted")?;
        info!(
            procedure = %self.procedure,
            kept,
            updated,
            inserted,
            "upsert procedure applied batch"
        );

        Ok(())
    }
}
