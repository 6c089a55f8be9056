//! Paginated HTTP batch source.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::source::{BatchSource, RawBatch};

/// Delay between retry attempts for a failed page fetch.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Settings for [`HttpPageSource`].
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Listing endpoint returning a JSON array of raw records. May contain a
    /// `{year}` placeholder; with `years` set, each year is fetched as its
    /// own sequence of page batches.
    pub base_url: String,
    pub user_agent: String,
    /// Model years to iterate, substituted into `{year}`. `None` runs a
    /// single unscoped pass.
    pub years: Option<Vec<i32>>,
    /// Upper bound on pages per year; pagination also stops at the first
    /// empty page.
    pub max_pages: u32,
    /// Pause between page requests, to stay polite with listing servers.
    pub pause: Duration,
    /// Retries per page before the batch is abandoned.
    pub retry_attempts: u32,
    pub timeout: Duration,
}

/// Fetches listing pages as batches.
///
/// Page 1 is the bare endpoint; every later page N appends a `page` cursor
/// holding the base64 encoding of N - 1, which is the scheme the listing
/// frontends use. Pagination for the current scope ends at the first empty
/// page.
#[derive(Debug)]
pub struct HttpPageSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
    years: Vec<Option<i32>>,
    year_index: usize,
    page: u32,
}

impl HttpPageSource {
    pub fn new(config: HttpSourceConfig) -> CatalogResult<HttpPageSource> {
        if config.years.is_some() && !config.base_url.contains("{year}") {
            return Err(CatalogError::Config(
                "years are configured but base_url has no {year} placeholder".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        let years = match &config.years {
            Some(years) => years.iter().copied().map(Some).collect(),
            None => vec![None],
        };
        Ok(HttpPageSource {
            client,
            config,
            years,
            year_index: 0,
            page: 1,
        })
    }

    fn page_url(&self, year: Option<i32>, page: u32) -> String {
        let base = match year {
            Some(year) => self.config.base_url.replace("{year}", &year.to_string()),
            None => self.config.base_url.clone(),
        };
        if page <= 1 {
            return base;
        }
        let cursor = BASE64.encode((page - 1).to_string());
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}page={cursor}")
    }

    async fn fetch_page(&self, url: &str) -> CatalogResult<Vec<Value>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<Vec<Value>>().await?)
    }

    async fn fetch_with_retry(&self, url: &str, label: &str) -> CatalogResult<Vec<Value>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_page(url).await {
                Ok(records) => return Ok(records),
                Err(error) if attempt <= self.config.retry_attempts => {
                    warn!(%url, attempt, %error, "page fetch failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(error) => return Err(error.in_batch(label, 0)),
            }
        }
    }
}

impl BatchSource for HttpPageSource {
    async fn next_batch(&mut self) -> CatalogResult<Option<RawBatch>> {
        loop {
            let Some(year) = self.years.get(self.year_index).copied() else {
                return Ok(None);
            };
            if self.page > self.config.max_pages {
                self.year_index += 1;
                self.page = 1;
                continue;
            }

            let label = match year {
                Some(year) => format!("{year}/page-{}", self.page),
                None => format!("page-{}", self.page),
            };
            let url = self.page_url(year, self.page);
            debug!(%url, batch = %label, "fetching page");

            let records = self.fetch_with_retry(&url, &label).await?;
            if records.is_empty() {
                // First empty page ends this scope.
                self.year_index += 1;
                self.page = 1;
                continue;
            }

            self.page += 1;
            if !self.config.pause.is_zero() {
                tokio::time::sleep(self.config.pause).await;
            }
            return Ok(Some(RawBatch { label, records }));
        }
    }
}
