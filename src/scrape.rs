use anyhow::{bail, Context, Result};
use clap::Args;

use crate::product::{is_fallback, ProductScraper};
use crate::telemetry::{self};

#[derive(Args, Debug)]
pub struct ScrapeCmd {
    /// Product page URL (must be on an Amazon domain)
    #[arg(long, conflicts_with = "asin")] pub url: Option<String>,
    /// 10-character ASIN; combined with --domain into /dp/{ASIN}
    #[arg(long)] pub asin: Option<String>,
    /// Marketplace host, e.g. www.amazon.co.uk (default: LISTING_DOMAIN or www.amazon.com)
    #[arg(long, requires = "asin")] pub domain: Option<String>,
}

pub async fn run(args: ScrapeCmd) -> Result<()> {
    let log = telemetry::scrape();
    let _g = log
        .root_span_kv([
            ("url", format!("{:?}", args.url)),
            ("asin", format!("{:?}", args.asin)),
            ("domain", format!("{:?}", args.domain)),
        ])
        .entered();

    let scraper = ProductScraper::from_env().context("init http fetcher")?;
    let record = match (&args.url, &args.asin) {
        (Some(url), _) => scraper.product(url).await,
        (None, Some(asin)) => scraper.product_by_asin(asin, args.domain.as_deref()).await?,
        (None, None) => bail!("provide --url or --asin"),
    };

    if is_fallback(&record) {
        log.warn("⚠️  page could not be scraped; showing placeholder record");
    }
    log.result(&record)?;
    Ok(())
}
