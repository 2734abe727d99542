use std::sync::LazyLock;

use regex::Regex;

use super::extract::is_absolute_url;
use super::types::{ProductRecord, RawFields, MAX_BULLETS, MAX_IMAGES};

static FIRST_FLOAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("float pattern"));
static FIRST_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:,\d+)*").expect("count pattern"));

/// Turn a raw field map into a record. Never fails: anything that cannot
/// be coerced falls back to that field's default.
pub fn normalize(raw: RawFields) -> ProductRecord {
    ProductRecord {
        title: trimmed(raw.title),
        brand: trimmed(raw.brand),
        feature_bullets: trimmed_list(raw.feature_bullets, MAX_BULLETS),
        description: trimmed(raw.description),
        rating: raw.rating.as_deref().map(parse_rating).unwrap_or(0.0),
        review_count: raw.review_count.as_deref().map(parse_review_count).unwrap_or(0),
        price: trimmed(raw.price),
        image_urls: raw
            .image_urls
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| is_absolute_url(u))
            .take(MAX_IMAGES)
            .collect(),
        categories: trimmed_list(raw.categories, usize::MAX),
    }
}

fn trimmed(s: Option<String>) -> String {
    s.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn trimmed_list(items: Vec<String>, cap: usize) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(cap)
        .collect()
}

/// First number in the text, clamped to the 0-5 star scale.
pub fn parse_rating(s: &str) -> f64 {
    first_number(s).map(|v| v.clamp(0.0, 5.0)).unwrap_or(0.0)
}

/// First integer in the text, thousands separators removed.
pub fn parse_review_count(s: &str) -> u64 {
    first_count(s).unwrap_or(0)
}

pub(crate) fn first_number(s: &str) -> Option<f64> {
    FIRST_FLOAT.find(s).and_then(|m| m.as_str().parse::<f64>().ok()).filter(|v| v.is_finite())
}

pub(crate) fn first_count(s: &str) -> Option<u64> {
    FIRST_COUNT.find(s).and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messy() -> RawFields {
        RawFields {
            title: Some("  Wireless Headphones \n".into()),
            brand: Some(" TechSound".into()),
            feature_bullets: (1..=8).map(|i| format!("  feature {i} ")).chain(["   ".to_string()]).collect(),
            description: None,
            rating: Some("4.5 out of 5 stars".into()),
            review_count: Some("1,234,567 global ratings".into()),
            price: Some(" $19.99 ".into()),
            image_urls: (0..14)
                .map(|i| if i % 3 == 0 { format!("/rel/{i}.jpg") } else { format!(" https://img.example.com/{i}.jpg") })
                .collect(),
            categories: vec![" Home ".into(), "".into(), "Kitchen".into()],
        }
    }

    #[test]
    fn trims_truncates_and_coerces() {
        let rec = normalize(messy());
        assert_eq!(rec.title, "Wireless Headphones");
        assert_eq!(rec.brand, "TechSound");
        assert_eq!(rec.description, "");
        assert_eq!(rec.feature_bullets.len(), 5);
        assert_eq!(rec.feature_bullets[0], "feature 1");
        assert_eq!(rec.rating, 4.5);
        assert_eq!(rec.review_count, 1_234_567);
        assert_eq!(rec.price, "$19.99");
        assert_eq!(rec.image_urls.len(), 9);
        assert!(rec.image_urls.iter().all(|u| u.starts_with("https://")));
        assert_eq!(rec.categories, vec!["Home", "Kitchen"]);
    }

    #[test]
    fn image_cap_is_ten() {
        let raw = RawFields {
            image_urls: (0..25).map(|i| format!("https://img.example.com/{i}.jpg")).collect(),
            ..Default::default()
        };
        assert_eq!(normalize(raw).image_urls.len(), 10);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(messy());
        let twice = normalize(RawFields::from(once.clone()));
        assert_eq!(once, twice);

        let empty = normalize(RawFields::default());
        assert_eq!(normalize(RawFields::from(empty.clone())), empty);
    }

    #[test]
    fn absent_fields_take_defaults() {
        let rec = normalize(RawFields::default());
        assert_eq!(rec, ProductRecord::default());
        assert_eq!(rec.rating, 0.0);
        assert_eq!(rec.review_count, 0);
    }

    #[test]
    fn rating_parsing() {
        assert_eq!(parse_rating("4.6 out of 5 stars"), 4.6);
        assert_eq!(parse_rating("5"), 5.0);
        assert_eq!(parse_rating("no stars yet"), 0.0);
        assert_eq!(parse_rating("rated 42 of 5"), 5.0);
    }

    #[test]
    fn review_count_parsing() {
        assert_eq!(parse_review_count("12,345 ratings"), 12_345);
        assert_eq!(parse_review_count("87 ratings"), 87);
        assert_eq!(parse_review_count("ratings"), 0);
    }
}
