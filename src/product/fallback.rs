use super::types::ProductRecord;

pub const TITLE_UNAVAILABLE: &str = "Title unavailable";
pub const FEATURES_UNAVAILABLE: &str = "Product features unavailable";
pub const DESCRIPTION_UNAVAILABLE: &str = "Description unavailable";
pub const BRAND_UNKNOWN: &str = "Unknown brand";
pub const PRICE_UNAVAILABLE: &str = "Price unavailable";

/// Placeholder record substituted when a page cannot be fetched or parsed.
pub fn fallback() -> ProductRecord {
    ProductRecord {
        title: TITLE_UNAVAILABLE.to_string(),
        brand: BRAND_UNKNOWN.to_string(),
        feature_bullets: vec![FEATURES_UNAVAILABLE.to_string()],
        description: DESCRIPTION_UNAVAILABLE.to_string(),
        rating: 0.0,
        review_count: 0,
        price: PRICE_UNAVAILABLE.to_string(),
        image_urls: Vec::new(),
        categories: Vec::new(),
    }
}

pub fn is_fallback(record: &ProductRecord) -> bool {
    *record == fallback()
}
