//! The listing job: resolve a product, generate its listing, hand back one
//! terminal value over a oneshot channel.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::Instrument;

use crate::listing::{Language, Listing, ListingGenerator};
use crate::product::{is_fallback, AsinError, ProductRecord, ProductScraper};
use crate::telemetry;
use crate::telemetry::ops::generate::Phase as GeneratePhase;

/// Where the job gets its product from.
#[derive(Clone, Debug)]
pub enum ProductSource {
    Url(String),
    Asin { asin: String, domain: Option<String> },
    /// An already scraped record, e.g. loaded from a JSON file.
    Record(ProductRecord),
}

#[derive(Clone, Debug)]
pub struct ListingRequest {
    pub source: ProductSource,
    pub languages: Vec<Language>,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListingOutcome {
    pub record: ProductRecord,
    /// True when the page could not be scraped and the placeholder was used.
    pub placeholder: bool,
    pub listing: Listing,
}

pub async fn resolve_product(scraper: &ProductScraper, source: ProductSource) -> Result<ProductRecord, AsinError> {
    match source {
        ProductSource::Url(url) => Ok(scraper.product(&url).await),
        ProductSource::Asin { asin, domain } => scraper.product_by_asin(&asin, domain.as_deref()).await,
        ProductSource::Record(record) => Ok(record),
    }
}

/// fetch -> extract -> normalize -> generate. Only an invalid ASIN fails.
pub async fn run_listing_job(
    scraper: &ProductScraper,
    generator: &ListingGenerator,
    req: ListingRequest,
) -> Result<ListingOutcome, AsinError> {
    let log = telemetry::generate();
    let record = resolve_product(scraper, req.source)
        .instrument(log.span(&GeneratePhase::Source))
        .await?;

    let phase = if generator.is_template() { GeneratePhase::Template } else { GeneratePhase::CallLlm };
    let listing = generator
        .listing(&record, &req.languages, req.count)
        .instrument(log.span_kv(&phase, [("languages", req.languages.len().to_string()), ("count", req.count.to_string())]))
        .await;

    Ok(ListingOutcome { placeholder: is_fallback(&record), record, listing })
}

/// Run the job on its own task. The receiver gets exactly one message.
pub fn spawn_listing_job(
    scraper: ProductScraper,
    generator: Arc<ListingGenerator>,
    req: ListingRequest,
) -> oneshot::Receiver<Result<ListingOutcome, AsinError>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let outcome = run_listing_job(&scraper, &generator, req).await;
        // receiver gone means nobody is waiting for the result
        let _ = tx.send(outcome);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::template;
    use crate::llm::mock::MockClient;
    use crate::product::fetch::mock::MockFetcher;
    use crate::product::fallback;
    use crate::product::fetch::{DelayRange, ScrapeConfig};

    const PAGE: &str = r#"<html><body>
        <span id="productTitle">Wireless Headphones</span>
        <a id="bylineInfo">TechSound</a>
        <ul id="feature-bullets"><li>Bluetooth 5.0</li></ul>
    </body></html>"#;

    fn scraper(mock: MockFetcher) -> ProductScraper {
        let cfg = ScrapeConfig { detail_delay: DelayRange::none(), search_delay: DelayRange::none(), ..Default::default() };
        ProductScraper::new(Arc::new(mock), cfg)
    }

    #[tokio::test]
    async fn spawned_job_delivers_one_outcome() {
        let url = "https://www.amazon.com/dp/B08N5WRWNW";
        let rx = spawn_listing_job(
            scraper(MockFetcher::new().with_page(url, PAGE)),
            Arc::new(ListingGenerator::template()),
            ListingRequest { source: ProductSource::Url(url.into()), languages: Language::ALL.to_vec(), count: 3 },
        );
        let outcome = rx.await.unwrap().unwrap();
        assert_eq!(outcome.record.title, "Wireless Headphones");
        assert!(!outcome.placeholder);
        assert_eq!(outcome.listing.copies().len(), 2);
        let zh = &outcome.listing.copies()[1];
        assert_eq!(zh.language, Language::Chinese);
        assert_eq!(zh.title, "【升级版】Wireless - 高品质，功能强大，TechSound官方正品");
        assert_eq!(zh.bullets.len(), 3);
    }

    #[tokio::test]
    async fn unreachable_page_still_produces_a_listing() {
        let rx = spawn_listing_job(
            scraper(MockFetcher::new()),
            Arc::new(ListingGenerator::template()),
            ListingRequest { source: ProductSource::Asin { asin: "B000000000".into(), domain: None }, languages: vec![Language::English], count: 5 },
        );
        let outcome = rx.await.unwrap().unwrap();
        assert!(outcome.placeholder);
        assert_eq!(outcome.record, fallback());
        assert_eq!(outcome.listing.copies()[0].bullets, template::bullets(Language::English, 5));
    }

    #[tokio::test]
    async fn invalid_asin_is_the_terminal_message() {
        let rx = spawn_listing_job(
            scraper(MockFetcher::new()),
            Arc::new(ListingGenerator::template()),
            ListingRequest { source: ProductSource::Asin { asin: "short".into(), domain: None }, languages: vec![Language::English], count: 5 },
        );
        assert!(matches!(rx.await.unwrap(), Err(AsinError::Invalid(_))));
    }

    #[tokio::test]
    async fn record_source_skips_fetching_and_uses_backend() {
        let client = Arc::new(MockClient::new());
        client.push_text("Wireless Headphones by TechSound");
        client.push_text("1. Clear sound everywhere\n2. Battery that lasts all week");
        client.push_text("A longer description.");
        let generator = ListingGenerator::with_client(client.clone(), None);
        let record = ProductRecord { title: "Wireless Headphones".into(), ..Default::default() };

        let outcome = run_listing_job(
            &scraper(MockFetcher::new()),
            &generator,
            ListingRequest { source: ProductSource::Record(record.clone()), languages: vec![Language::English], count: 5 },
        )
        .await
        .unwrap();
        assert_eq!(outcome.record, record);
        let en = &outcome.listing.copies()[0];
        assert_eq!(en.title, "Wireless Headphones by TechSound");
        assert_eq!(en.bullets, vec!["Clear sound everywhere", "Battery that lasts all week"]);
        assert_eq!(en.description, "A longer description.");
        assert_eq!(client.calls().len(), 3);
    }
}
