use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::product::{ProductScraper, SearchHit};
use crate::telemetry::{self};

#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Free-text search query
    pub query: String,
    #[arg(long, default_value_t = 10)] pub max_results: usize,
    /// Marketplace host (default: LISTING_DOMAIN or www.amazon.com)
    #[arg(long)] pub domain: Option<String>,
}

#[derive(Serialize)]
struct SearchResult<'a> {
    query: &'a str,
    hits: &'a [SearchHit],
}

pub async fn run(args: SearchCmd) -> Result<()> {
    let log = telemetry::search();
    let _g = log
        .root_span_kv([
            ("query", args.query.clone()),
            ("max_results", args.max_results.to_string()),
            ("domain", format!("{:?}", args.domain)),
        ])
        .entered();

    let mut scraper = ProductScraper::from_env().context("init http fetcher")?;
    if let Some(domain) = &args.domain {
        scraper = scraper.with_domain(domain);
    }
    let hits = scraper.search(&args.query, args.max_results).await;

    for (i, hit) in hits.iter().enumerate() {
        log.info(format!(
            "{:>2}. {} [{}] price={} rating={} reviews={}",
            i + 1,
            hit.title,
            hit.asin.as_deref().unwrap_or("-"),
            hit.price.as_deref().unwrap_or("-"),
            hit.rating.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
            hit.review_count.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
        ));
    }
    log.result(&SearchResult { query: &args.query, hits: &hits })?;
    Ok(())
}
