use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::Instrument;
use url::Url;

use super::extract::element_text;
use super::normalize::{first_count, first_number};
use super::types::SearchHit;
use super::{FetchError, ProductScraper};
use crate::telemetry;
use crate::telemetry::ops::search::Phase as SearchPhase;

static RESULT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[data-component-type='s-search-result']").expect("result selector"));
static TITLE_HEADINGS: LazyLock<[Selector; 2]> = LazyLock::new(|| {
    [
        Selector::parse("h2.a-size-mini").expect("title selector"),
        Selector::parse("h2.a-size-base").expect("title selector"),
    ]
});
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("link selector"));
static PRICE_WHOLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.a-price-whole").expect("price selector"));
static PRICE_FRACTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.a-price-fraction").expect("price selector"));
static RATING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span[class*='a-icon-alt']").expect("rating selector"));
static REVIEWS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span[class*='a-size-base']").expect("reviews selector"));

impl ProductScraper {
    /// Search the configured marketplace. Best effort: any failure is
    /// logged and yields an empty list.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        let log = telemetry::search();
        let domain = self.config().domain.clone();
        let result = async {
            let url = search_url(&domain, query)?;
            let html = self
                .fetcher
                .fetch_page(url.as_str())
                .instrument(log.span_kv(&SearchPhase::Fetch, [("url", url.to_string())]))
                .await?;
            let hits = {
                let _s = log.span(&SearchPhase::Parse).entered();
                parse_search_results(&html, max_results, &domain)
            };
            Ok::<_, FetchError>(hits)
        }
        .await;

        match result {
            Ok(hits) => {
                log.info_kv("🔎 search complete", [("query", query.to_string()), ("hits", hits.len().to_string())]);
                self.config().search_delay.pause().await;
                hits
            }
            Err(err) => {
                log.warn_kv("⚠️  search failed", [("query", query.to_string()), ("error", err.to_string())]);
                Vec::new()
            }
        }
    }
}

/// `https://{domain}/s?k={query}` with the query form-encoded.
pub fn search_url(domain: &str, query: &str) -> Result<Url, FetchError> {
    let base = format!("https://{}/s", domain.trim_end_matches('/'));
    let mut url = Url::parse(&base).map_err(|_| FetchError::InvalidUrl(base.clone()))?;
    url.query_pairs_mut().append_pair("k", query.trim());
    Ok(url)
}

/// Pull up to `max_results` hits out of a search results page. Cards
/// without a title link are skipped.
pub fn parse_search_results(html: &str, max_results: usize, domain: &str) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    let Ok(base) = Url::parse(&format!("https://{}/", domain.trim_end_matches('/'))) else {
        return Vec::new();
    };
    doc.select(&RESULT).filter_map(|card| parse_card(card, &base)).take(max_results).collect()
}

fn parse_card(card: ElementRef<'_>, base: &Url) -> Option<SearchHit> {
    let link = TITLE_HEADINGS
        .iter()
        .find_map(|sel| card.select(sel).next())
        .and_then(|h2| h2.select(&LINK).next())?;
    let title = element_text(link);
    let href = link.value().attr("href").unwrap_or_default();
    let url = base.join(href).ok()?;
    if title.is_empty() {
        return None;
    }

    let asin = url
        .query_pairs()
        .find(|(k, _)| k == "pd_rd_i")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .or_else(|| card.value().attr("data-asin").map(str::to_string).filter(|v| !v.is_empty()));

    Some(SearchHit {
        title,
        url: url.to_string(),
        asin,
        price: price(card),
        rating: card.select(&RATING).next().and_then(|el| first_number(&element_text(el))),
        review_count: card.select(&REVIEWS).next().and_then(|el| first_count(&element_text(el))),
    })
}

// "24." + "99" -> "24.99"
fn price(card: ElementRef<'_>) -> Option<String> {
    let whole = card.select(&PRICE_WHOLE).next().map(element_text)?;
    let whole = whole.trim_end_matches('.').to_string();
    if whole.is_empty() {
        return None;
    }
    match card.select(&PRICE_FRACTION).next().map(element_text).filter(|f| !f.is_empty()) {
        Some(fraction) => Some(format!("{whole}.{fraction}")),
        None => Some(whole),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::product::fetch::mock::MockFetcher;
    use crate::product::fetch::{DelayRange, ScrapeConfig};

    const RESULTS: &str = r#"<html><body>
      <div data-component-type="s-search-result" data-asin="B0FALLBACK">
        <h2 class="a-size-mini"><a href="/TechSound-Headphones/dp/B08N5WRWNW/?pd_rd_i=B08N5WRWNW&amp;th=1">
          <span>TechSound Wireless Headphones</span></a></h2>
        <span class="a-price"><span class="a-price-whole">59.</span><span class="a-price-fraction">99</span></span>
        <i class="a-icon a-icon-star-small"><span class="a-icon-alt">4.5 out of 5 stars</span></i>
        <span class="a-size-base s-underline-text">12,345</span>
      </div>
      <div data-component-type="s-search-result" data-asin="B000000002">
        <h2 class="a-size-base"><a href="/dp/B000000002"><span>Budget Earbuds</span></a></h2>
      </div>
      <div data-component-type="s-search-result" data-asin="B000000003">
        <div class="sponsored">no heading here</div>
      </div>
      <div data-component-type="s-search-result" data-asin="B000000004">
        <h2 class="a-size-mini"><a href="/dp/B000000004"><span>Studio Monitors</span></a></h2>
      </div>
    </body></html>"#;

    #[test]
    fn parses_cards_in_order() {
        let hits = parse_search_results(RESULTS, 10, "www.amazon.com");
        assert_eq!(hits.len(), 3);

        let first = &hits[0];
        assert_eq!(first.title, "TechSound Wireless Headphones");
        assert_eq!(first.url, "https://www.amazon.com/TechSound-Headphones/dp/B08N5WRWNW/?pd_rd_i=B08N5WRWNW&th=1");
        assert_eq!(first.asin.as_deref(), Some("B08N5WRWNW"));
        assert_eq!(first.price.as_deref(), Some("59.99"));
        assert_eq!(first.rating, Some(4.5));
        assert_eq!(first.review_count, Some(12345));

        let second = &hits[1];
        assert_eq!(second.title, "Budget Earbuds");
        assert_eq!(second.asin.as_deref(), Some("B000000002"));
        assert_eq!(second.price, None);
        assert_eq!(second.rating, None);
        assert_eq!(second.review_count, None);
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(parse_search_results(RESULTS, 1, "www.amazon.com").len(), 1);
        assert!(parse_search_results(RESULTS, 0, "www.amazon.com").is_empty());
        assert!(parse_search_results("<html></html>", 10, "www.amazon.com").is_empty());
    }

    #[test]
    fn search_url_encodes_query() {
        let url = search_url("www.amazon.de", "wireless headphones").unwrap();
        assert_eq!(url.as_str(), "https://www.amazon.de/s?k=wireless+headphones");
    }

    #[tokio::test]
    async fn search_failure_is_an_empty_list() {
        let cfg = ScrapeConfig { search_delay: DelayRange::none(), ..Default::default() };
        let mock = Arc::new(MockFetcher::new().with_page("https://www.amazon.com/s?k=earbuds", RESULTS));
        let scraper = ProductScraper::new(mock.clone(), cfg);

        assert_eq!(scraper.search("earbuds", 2).await.len(), 2);
        assert!(scraper.search("nothing served", 5).await.is_empty());
        assert_eq!(mock.calls().len(), 2);
    }
}
