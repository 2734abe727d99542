use serde::{Deserialize, Serialize};

pub const MAX_BULLETS: usize = 5;
pub const MAX_IMAGES: usize = 10;

/// Structured view of one product page. Every field has a default, so a
/// record is always fully populated even when the page had nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    pub title: String,
    pub brand: String,
    pub feature_bullets: Vec<String>,
    pub description: String,
    pub rating: f64,
    pub review_count: u64,
    pub price: String,
    pub image_urls: Vec<String>,
    pub categories: Vec<String>,
}

/// Field map as it comes off the page, before trimming and coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFields {
    pub title: Option<String>,
    pub brand: Option<String>,
    pub feature_bullets: Vec<String>,
    pub description: Option<String>,
    pub rating: Option<String>,
    pub review_count: Option<String>,
    pub price: Option<String>,
    pub image_urls: Vec<String>,
    pub categories: Vec<String>,
}

impl From<ProductRecord> for RawFields {
    fn from(r: ProductRecord) -> Self {
        RawFields {
            title: Some(r.title),
            brand: Some(r.brand),
            feature_bullets: r.feature_bullets,
            description: Some(r.description),
            rating: Some(r.rating.to_string()),
            review_count: Some(r.review_count.to_string()),
            price: Some(r.price),
            image_urls: r.image_urls,
            categories: r.categories,
        }
    }
}

// One card from a search results listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
}
