//! Product pages in, structured records out.
//!
//! `fetch` is the only fallible stage. Extraction and normalization absorb
//! every kind of absence, and [`ProductScraper::product`] turns a fetch
//! failure into the fixed [`fallback`] record.

pub mod asin;
pub mod extract;
pub mod fallback;
pub mod fetch;
pub mod normalize;
pub mod search;
pub mod types;

use std::sync::Arc;

use tracing::Instrument;

pub use asin::{Asin, AsinError};
pub use extract::extract_fields;
pub use fallback::{fallback, is_fallback};
pub use fetch::{FetchError, HttpFetcher, PageFetcher, ScrapeConfig};
pub use normalize::normalize;
pub use types::{ProductRecord, SearchHit};

use crate::telemetry;
use crate::telemetry::ops::scrape::Phase as ScrapePhase;

#[derive(Clone)]
pub struct ProductScraper {
    fetcher: Arc<dyn PageFetcher>,
    cfg: ScrapeConfig,
}

impl ProductScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cfg: ScrapeConfig) -> Self { Self { fetcher, cfg } }

    /// HTTP fetcher configured from the environment.
    pub fn from_env() -> Result<Self, FetchError> {
        let cfg = ScrapeConfig::from_env();
        let fetcher = HttpFetcher::new(&cfg)?;
        Ok(Self::new(Arc::new(fetcher), cfg))
    }

    pub fn config(&self) -> &ScrapeConfig { &self.cfg }

    /// Same fetcher, different marketplace for ASIN lookups and search.
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.cfg.domain = domain.trim().to_string();
        self
    }

    /// Fetch, extract and normalize one product page.
    pub async fn try_product(&self, url: &str) -> Result<ProductRecord, FetchError> {
        let log = telemetry::scrape();
        ensure_amazon_url(url)?;

        let html = self
            .fetcher
            .fetch_page(url)
            .instrument(log.span_kv(&ScrapePhase::Fetch, [("url", url.to_string())]))
            .await?;

        let raw = {
            let _s = log.span(&ScrapePhase::Extract).entered();
            extract_fields(&html)
        };
        let record = {
            let _s = log.span(&ScrapePhase::Normalize).entered();
            normalize(raw)
        };
        log.record_summary(&record);

        self.cfg.detail_delay.pause().await;
        Ok(record)
    }

    /// Like [`try_product`](Self::try_product) but total: any failure yields
    /// the fallback record.
    pub async fn product(&self, url: &str) -> ProductRecord {
        match self.try_product(url).await {
            Ok(record) => record,
            Err(err) => {
                let log = telemetry::scrape();
                let _s = log.span(&ScrapePhase::Fallback).entered();
                let kind = if err.is_transport() { "transport" } else { "input" };
                log.warn_kv(
                    "⚠️  scrape failed, using placeholder record",
                    [("url", url.to_string()), ("kind", kind.to_string()), ("error", err.to_string())],
                );
                fallback()
            }
        }
    }

    /// Validate the ASIN, build `https://{domain}/dp/{asin}` and scrape it.
    /// `domain` defaults to the configured marketplace.
    pub async fn product_by_asin(&self, asin: &str, domain: Option<&str>) -> Result<ProductRecord, AsinError> {
        let asin = Asin::parse(asin)?;
        let url = asin.product_url(domain.unwrap_or(&self.cfg.domain));
        Ok(self.product(&url).await)
    }
}

fn ensure_amazon_url(url: &str) -> Result<(), FetchError> {
    let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
    match parsed.host_str() {
        Some(host) if host.to_ascii_lowercase().contains("amazon") => Ok(()),
        _ => Err(FetchError::NotAmazon(url.to_string())),
    }
}
