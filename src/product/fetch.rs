use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, StatusCode};

use super::asin::DEFAULT_DOMAIN;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Randomised pause inserted after each successful page fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self { min: Duration::from_millis(min), max: Duration::from_millis(max) }
    }

    pub const fn none() -> Self { Self::from_millis(0, 0) }

    /// Accepts "1000-3000" (milliseconds) or a single fixed value like "500".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (lo, hi) = match s.split_once('-') {
            Some((lo, hi)) => (lo.trim().parse::<u64>().ok()?, hi.trim().parse::<u64>().ok()?),
            None => {
                let v = s.parse::<u64>().ok()?;
                (v, v)
            }
        };
        if lo > hi { return None; }
        Some(Self::from_millis(lo, hi))
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min { return self.min; }
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }

    pub async fn pause(&self) {
        let d = self.sample();
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub accept_language: String,
    /// Marketplace host used for ASIN lookups and search.
    pub domain: String,
    /// None leaves the HTTP client's own default in place.
    pub timeout: Option<Duration>,
    pub detail_delay: DelayRange,
    pub search_delay: DelayRange,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            timeout: None,
            detail_delay: DelayRange::from_millis(1_000, 3_000),
            search_delay: DelayRange::from_millis(2_000, 4_000),
        }
    }
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(ua) = std::env::var("LISTING_USER_AGENT") {
            if !ua.trim().is_empty() { cfg.user_agent = ua; }
        }
        if let Ok(lang) = std::env::var("LISTING_ACCEPT_LANGUAGE") {
            if !lang.trim().is_empty() { cfg.accept_language = lang; }
        }
        if let Ok(domain) = std::env::var("LISTING_DOMAIN") {
            if !domain.trim().is_empty() { cfg.domain = domain.trim().to_string(); }
        }
        if let Ok(secs) = std::env::var("LISTING_FETCH_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse::<u64>() {
                cfg.timeout = Some(Duration::from_secs(parsed));
            }
        }
        if let Some(d) = std::env::var("LISTING_DETAIL_DELAY_MS").ok().as_deref().and_then(DelayRange::parse) {
            cfg.detail_delay = d;
        }
        if let Some(d) = std::env::var("LISTING_SEARCH_DELAY_MS").ok().as_deref().and_then(DelayRange::parse) {
            cfg.search_delay = d;
        }
        cfg
    }
}

/// Transport boundary: fetch a page's markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    http: HttpClient,
}

impl HttpFetcher {
    pub fn new(cfg: &ScrapeConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, header_value("user-agent", &cfg.user_agent)?);
        headers.insert(header::ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, header_value("accept-language", &cfg.accept_language)?);

        let mut builder = HttpClient::builder().default_headers(headers).gzip(true);
        if let Some(t) = cfg.timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().map_err(FetchError::Http)?;
        Ok(Self { http })
    }
}

fn header_value(name: &'static str, v: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(v).map_err(|_| FetchError::Config(format!("invalid {name} header value")))
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.http.get(url).send().await.map_err(FetchError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        response.text().await.map_err(FetchError::Http)
    }
}

#[derive(Debug)]
pub enum FetchError {
    InvalidUrl(String),
    NotAmazon(String),
    Config(String),
    Http(reqwest::Error),
    Status(StatusCode),
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Http(_) | FetchError::Status(_))
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidUrl(u) => write!(f, "invalid url: {u}"),
            FetchError::NotAmazon(u) => write!(f, "url must be on an Amazon domain: {u}"),
            FetchError::Config(msg) => write!(f, "fetcher config error: {msg}"),
            FetchError::Http(err) => write!(f, "http error: {err}"),
            FetchError::Status(status) => write!(f, "unexpected status {status}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err),
            _ => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_range_parsing() {
        assert_eq!(DelayRange::parse("1000-3000"), Some(DelayRange::from_millis(1000, 3000)));
        assert_eq!(DelayRange::parse(" 250 "), Some(DelayRange::from_millis(250, 250)));
        assert_eq!(DelayRange::parse("0"), Some(DelayRange::none()));
        assert_eq!(DelayRange::parse("3000-1000"), None);
        assert_eq!(DelayRange::parse("fast"), None);
    }

    #[test]
    fn delay_sample_stays_in_range() {
        let r = DelayRange::from_millis(10, 20);
        for _ in 0..50 {
            let d = r.sample();
            assert!(d >= r.min && d <= r.max);
        }
        assert_eq!(DelayRange::none().sample(), Duration::ZERO);
    }

    #[test]
    fn default_config_matches_politeness_windows() {
        let cfg = ScrapeConfig::default();
        assert_eq!(cfg.detail_delay, DelayRange::from_millis(1_000, 3_000));
        assert_eq!(cfg.search_delay, DelayRange::from_millis(2_000, 4_000));
        assert_eq!(cfg.domain, "www.amazon.com");
        assert!(cfg.timeout.is_none());
    }

    #[test]
    fn http_fetcher_rejects_bad_header() {
        let cfg = ScrapeConfig { user_agent: "bad\nagent".into(), ..Default::default() };
        assert!(matches!(HttpFetcher::new(&cfg), Err(FetchError::Config(_))));
    }

    #[tokio::test]
    async fn mock_fetcher_serves_known_pages_only() {
        let mock = mock::MockFetcher::new().with_page("https://www.amazon.com/dp/X", "<html></html>");
        assert_eq!(mock.fetch_page("https://www.amazon.com/dp/X").await.unwrap(), "<html></html>");
        let err = mock.fetch_page("https://www.amazon.com/dp/Y").await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(mock.calls().len(), 2);
    }
}
