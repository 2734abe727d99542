use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use super::types::{RawFields, MAX_BULLETS, MAX_IMAGES};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Title,
    Brand,
    FeatureBullets,
    Description,
    Rating,
    ReviewCount,
    Price,
    ImageUrls,
    Categories,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Title,
        Field::Brand,
        Field::FeatureBullets,
        Field::Description,
        Field::Rating,
        Field::ReviewCount,
        Field::Price,
        Field::ImageUrls,
        Field::Categories,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Brand => "brand",
            Field::FeatureBullets => "feature_bullets",
            Field::Description => "description",
            Field::Rating => "rating",
            Field::ReviewCount => "review_count",
            Field::Price => "price",
            Field::ImageUrls => "image_urls",
            Field::Categories => "categories",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

/// One way of locating an element on a product page.
#[derive(Copy, Clone, Debug)]
enum Lookup {
    Css(&'static str),
    /// `tag` whose class attribute contains the needle, ignoring case
    ClassContains(&'static str, &'static str),
    /// `tag` whose id contains the needle, ignoring case
    IdContains(&'static str, &'static str),
}

impl Lookup {
    fn first<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        match *self {
            Lookup::Css(css) => {
                let sel = Selector::parse(css).ok()?;
                doc.select(&sel).next()
            }
            Lookup::ClassContains(tag, needle) => first_attr_containing(doc, tag, "class", needle),
            Lookup::IdContains(tag, needle) => first_attr_containing(doc, tag, "id", needle),
        }
    }
}

fn first_attr_containing<'a>(doc: &'a Html, tag: &str, attr: &str, needle: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(&format!("{tag}[{attr}]")).ok()?;
    doc.select(&sel).find(|el| {
        el.value()
            .attr(attr)
            .map(|v| v.to_ascii_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

// Ordered per field: earlier entries match the more common page templates.
const TITLE: &[Lookup] = &[
    Lookup::Css("#productTitle"),
    Lookup::Css("span#productTitle"),
    Lookup::ClassContains("h1", "title"),
];
const BULLET_CONTAINERS: &[Lookup] = &[Lookup::Css("ul#feature-bullets"), Lookup::Css("div#feature-bullets")];
const DESCRIPTION: &[Lookup] = &[
    Lookup::Css("div#productDescription"),
    Lookup::Css("div#aplus"),
    Lookup::Css("div[data-feature-name=productDescription]"),
];
const BRAND: &[Lookup] = &[Lookup::Css("a#bylineInfo"), Lookup::ClassContains("span", "brand")];
const RATING: &[Lookup] = &[Lookup::Css("span#acrPopover")];
const REVIEW_COUNT: &[Lookup] = &[Lookup::Css("span#acrCustomerReviewText")];
const PRICE: &[Lookup] = &[Lookup::ClassContains("span", "price"), Lookup::IdContains("span", "price")];
const THUMB_GRIDS: &[Lookup] = &[Lookup::Css("#altImages"), Lookup::Css("div[data-action=thumb-grid]")];
const MAIN_IMAGE: &[Lookup] = &[Lookup::Css("#landingImage"), Lookup::Css("img#prodImage")];
const BREADCRUMBS: &[Lookup] = &[Lookup::Css("div#wayfinding-breadcrumbs_feature_div")];

const THUMB_ATTRS: [&str; 3] = ["src", "data-old-hires", "data-thumb-url"];

/// Extract one field. `None` means every strategy for that field came up empty.
pub fn extract(doc: &Html, field: Field) -> Option<RawValue> {
    match field {
        Field::Title => first_text(doc, TITLE).map(RawValue::Text),
        Field::Brand => first_text(doc, BRAND).map(RawValue::Text),
        Field::Description => first_text(doc, DESCRIPTION).map(RawValue::Text),
        Field::Price => first_text(doc, PRICE).map(RawValue::Text),
        Field::ReviewCount => first_text(doc, REVIEW_COUNT).map(RawValue::Text),
        Field::Rating => first_attr(doc, RATING, "title").map(RawValue::Text),
        Field::FeatureBullets => bullets(doc).map(RawValue::List),
        Field::ImageUrls => images(doc).map(RawValue::List),
        Field::Categories => breadcrumbs(doc).map(RawValue::List),
    }
}

/// Run every field extractor over a page.
pub fn extract_fields(html: &str) -> RawFields {
    let doc = Html::parse_document(html);
    let mut raw = RawFields::default();
    for field in Field::ALL {
        let Some(value) = extract(&doc, field) else {
            tracing::debug!(field = field.name(), "no selector matched");
            continue;
        };
        match (field, value) {
            (Field::Title, RawValue::Text(s)) => raw.title = Some(s),
            (Field::Brand, RawValue::Text(s)) => raw.brand = Some(s),
            (Field::Description, RawValue::Text(s)) => raw.description = Some(s),
            (Field::Price, RawValue::Text(s)) => raw.price = Some(s),
            (Field::Rating, RawValue::Text(s)) => raw.rating = Some(s),
            (Field::ReviewCount, RawValue::Text(s)) => raw.review_count = Some(s),
            (Field::FeatureBullets, RawValue::List(v)) => raw.feature_bullets = v,
            (Field::ImageUrls, RawValue::List(v)) => raw.image_urls = v,
            (Field::Categories, RawValue::List(v)) => raw.categories = v,
            _ => {}
        }
    }
    raw
}

fn first_text(doc: &Html, lookups: &[Lookup]) -> Option<String> {
    lookups
        .iter()
        .filter_map(|l| l.first(doc))
        .map(element_text)
        .find(|s| !s.is_empty())
}

fn first_attr(doc: &Html, lookups: &[Lookup], attr: &str) -> Option<String> {
    lookups
        .iter()
        .filter_map(|l| l.first(doc))
        .filter_map(|el| el.value().attr(attr).map(|v| v.trim().to_string()))
        .find(|s| !s.is_empty())
}

fn bullets(doc: &Html) -> Option<Vec<String>> {
    let li = Selector::parse("li").ok()?;
    BULLET_CONTAINERS
        .iter()
        .filter_map(|l| l.first(doc))
        .map(|container| {
            container
                .select(&li)
                .take(MAX_BULLETS)
                .map(|item| strip_bullet_glyphs(&element_text(item)).to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .find(|v| !v.is_empty())
}

fn strip_bullet_glyphs(s: &str) -> &str {
    s.trim_start_matches(|c: char| c == '*' || c == '-' || c == '•' || c.is_whitespace())
}

fn images(doc: &Html) -> Option<Vec<String>> {
    let img = Selector::parse("img").ok()?;
    // thumbnail grid first; the first container found decides
    if let Some(grid) = THUMB_GRIDS.iter().find_map(|l| l.first(doc)) {
        let urls: Vec<String> = grid
            .select(&img)
            .filter_map(|tag| THUMB_ATTRS.iter().find_map(|a| tag.value().attr(a).filter(|v| !v.is_empty())))
            .filter(|src| is_absolute_url(src))
            .take(MAX_IMAGES)
            .map(str::to_string)
            .collect();
        if !urls.is_empty() { return Some(urls); }
    }

    let main = MAIN_IMAGE.iter().find_map(|l| l.first(doc))?;
    let src = main.value().attr("src").filter(|v| !v.trim().is_empty());
    let url = match src {
        Some(s) => Some(s.trim().to_string()),
        None => main.value().attr("data-a-dynamic-image").and_then(first_dynamic_image),
    }?;
    if is_absolute_url(&url) { Some(vec![url]) } else { None }
}

/// `data-a-dynamic-image` is either a plain URL or a JSON map of URL -> [w, h].
fn first_dynamic_image(attr: &str) -> Option<String> {
    let attr = attr.trim();
    if attr.starts_with('{') {
        let map: Map<String, Value> = serde_json::from_str(attr).ok()?;
        map.keys().find(|k| is_absolute_url(k)).cloned()
    } else if attr.is_empty() {
        None
    } else {
        Some(attr.to_string())
    }
}

fn breadcrumbs(doc: &Html) -> Option<Vec<String>> {
    let a = Selector::parse("a").ok()?;
    let container = BREADCRUMBS.iter().find_map(|l| l.first(doc))?;
    Some(container.select(&a).map(element_text).filter(|s| !s.is_empty()).collect())
}

pub(crate) fn is_absolute_url(s: &str) -> bool {
    let s = s.trim();
    s.starts_with("http://") || s.starts_with("https://")
}

/// Visible text under an element, whitespace collapsed. Script and style
/// bodies are skipped.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else { continue };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| matches!(e.name(), "script" | "style" | "noscript")))
            .unwrap_or(false);
        if !hidden { parts.push(text); }
    }
    collapse_whitespace(&parts.join(" "))
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
