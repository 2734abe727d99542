use std::marker::PhantomData;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn, Span};

use super::emit;
use crate::output::types::Meta;
use crate::listing::Listing;
use crate::product::ProductRecord;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

/// Per-command logging handle. Text mode prints the message only;
/// JSON mode attaches the op name and key=value details.
pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    started: Instant,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    pub(crate) fn new(json: bool) -> Self { Self { json, started: Instant::now(), _marker: PhantomData } }

    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(fields);
        if details.is_empty() {
            debug!(op = %self.op_name(), "start");
        } else {
            debug!(op = %self.op_name(), details = %details, "start");
        }
        self.root_span()
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(fields);
        if !details.is_empty() {
            debug!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        self.span(ph)
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); }
    }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { info!(op = %self.op_name(), details = %details, "{}", msg); }
        else if details.is_empty() { info!("{}", msg); }
        else { info!("{} {}", msg, details); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else if details.is_empty() { warn!("{}", msg); }
        else { warn!("{} {}", msg, details); }
    }

    /// Time since this handle was created, attached to every envelope.
    pub fn meta(&self) -> Meta { Meta { duration_ms: Some(self.started.elapsed().as_millis()) } }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> { emit::print_plan(self.op_name(), plan, Some(self.meta())) }
    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> { emit::print_result(self.op_name(), result, Some(self.meta())) }
}

impl LogCtx<super::ops::scrape::Scrape> {
    pub fn record_summary(&self, r: &ProductRecord) {
        if self.json {
            info!(op = %self.op_name(), bullets = r.feature_bullets.len(), images = r.image_urls.len(),
                  categories = r.categories.len(), rating = r.rating, reviews = r.review_count, "record");
        } else {
            info!("📦 {} — bullets={} images={} rating={} reviews={}",
                  if r.title.is_empty() { "(untitled)" } else { r.title.as_str() },
                  r.feature_bullets.len(), r.image_urls.len(), r.rating, r.review_count);
        }
    }
}

impl LogCtx<super::ops::generate::Generate> {
    pub fn listing_summary(&self, listing: &Listing) {
        for copy in listing.copies() {
            if self.json {
                info!(op = %self.op_name(), language = copy.language.name(), bullets = copy.bullets.len(),
                      description_chars = copy.description.chars().count(), "listing");
            } else {
                info!("📝 [{}] {}", copy.language.name(), copy.title);
                for b in &copy.bullets { info!("   • {}", b); }
                info!("   {}", copy.description.trim());
            }
        }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    kv.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ")
}
