pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::Instrument;

use crate::listing::{prompt, Backend, ContentKind, ListingGenerator, DEFAULT_BULLET_COUNT};
use crate::pipeline::{resolve_product, spawn_listing_job, ListingRequest, ProductSource};
use crate::product::{is_fallback, ProductRecord, ProductScraper};
use crate::telemetry::ops::generate::Phase as GeneratePhase;
use crate::telemetry::{self};
use types::{GeneratePlan, LanguageArg, PromptPlan};

#[derive(Args, Debug)]
pub struct GenerateCmd {
    /// Product page URL
    #[arg(long, conflicts_with_all = ["asin", "record"])] pub url: Option<String>,
    /// 10-character ASIN
    #[arg(long, conflicts_with = "record")] pub asin: Option<String>,
    #[arg(long, requires = "asin")] pub domain: Option<String>,
    /// JSON file holding a previously scraped product record
    #[arg(long)] pub record: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Backend::OpenAi)] pub backend: Backend,
    #[arg(long, value_enum, default_value_t = LanguageArg::Both)] pub language: LanguageArg,
    /// Number of bullet points per language (0-5)
    #[arg(long, default_value_t = DEFAULT_BULLET_COUNT,
          value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(0..=DEFAULT_BULLET_COUNT as u64))]
    pub count: usize,
    /// Override the backend's default model
    #[arg(long)] pub model: Option<String>,
    /// Print the prompts that would be sent; no backend is called
    #[arg(long, default_value_t = false)] pub dry_run: bool,
}

impl GenerateCmd {
    fn source(&self) -> Result<ProductSource> {
        if let Some(url) = &self.url {
            return Ok(ProductSource::Url(url.clone()));
        }
        if let Some(asin) = &self.asin {
            return Ok(ProductSource::Asin { asin: asin.clone(), domain: self.domain.clone() });
        }
        if let Some(path) = &self.record {
            return Ok(ProductSource::Record(load_record(path)?));
        }
        bail!("provide one of --url, --asin or --record")
    }
}

pub fn load_record(path: &Path) -> Result<ProductRecord> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse product record {}", path.display()))
}

fn describe(source: &ProductSource) -> String {
    match source {
        ProductSource::Url(url) => url.clone(),
        ProductSource::Asin { asin, domain } => format!("asin:{asin}@{}", domain.as_deref().unwrap_or("default")),
        ProductSource::Record(_) => "record".to_string(),
    }
}

pub async fn run(args: GenerateCmd) -> Result<()> {
    let log = telemetry::generate();
    let _g = log
        .root_span_kv([
            ("backend", format!("{:?}", args.backend)),
            ("language", format!("{:?}", args.language)),
            ("count", args.count.to_string()),
            ("model", format!("{:?}", args.model)),
            ("dry_run", args.dry_run.to_string()),
        ])
        .entered();

    let source = args.source()?;
    let source_label = describe(&source);
    let languages = args.language.languages();
    let scraper = ProductScraper::from_env().context("init http fetcher")?;

    if args.dry_run {
        let record = resolve_product(&scraper, source).instrument(log.span(&GeneratePhase::Source)).await?;
        let _s = log.span(&GeneratePhase::Prompt).entered();
        let mut prompts = Vec::new();
        for &language in &languages {
            for kind in ContentKind::ALL {
                prompts.push(PromptPlan {
                    language,
                    kind,
                    max_tokens: prompt::max_tokens(kind),
                    system: prompt::system_message(kind),
                    user: prompt::user_prompt(&record, kind, language, args.count),
                });
            }
        }
        log.info(format!("📝 {} prompt(s) planned for {} — no backend called", prompts.len(), source_label));
        for p in &prompts {
            log.info(format!("── [{} / {}] max_tokens={}", p.language.name(), p.kind.name(), p.max_tokens));
            log.info(&p.user);
        }
        let plan = GeneratePlan {
            backend: args.backend,
            model: args.model.clone(),
            source: source_label,
            placeholder: is_fallback(&record),
            count: args.count,
            prompts,
        };
        log.plan(&plan)?;
        return Ok(());
    }

    let generator = Arc::new(ListingGenerator::from_backend(args.backend, args.model.clone()));
    if generator.is_template() {
        log.info("🧩 using template generation");
    }

    let rx = spawn_listing_job(scraper, generator, ListingRequest { source, languages, count: args.count });
    let outcome = rx.await.context("listing job ended without a result")??;

    let _s = log.span(&GeneratePhase::Output).entered();
    if outcome.placeholder {
        log.warn_kv("⚠️  product page unavailable; listing built from placeholder record", [("source", source_label)]);
    }
    log.listing_summary(&outcome.listing);
    log.result(&outcome)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd() -> GenerateCmd {
        GenerateCmd {
            url: None,
            asin: None,
            domain: None,
            record: None,
            backend: Backend::Template,
            language: LanguageArg::Both,
            count: 5,
            model: None,
            dry_run: false,
        }
    }

    #[test]
    fn source_requires_an_input() {
        assert!(cmd().source().is_err());
        let c = GenerateCmd { asin: Some("B08N5WRWNW".into()), domain: Some("www.amazon.de".into()), ..cmd() };
        assert_eq!(describe(&c.source().unwrap()), "asin:B08N5WRWNW@www.amazon.de");
    }

    #[test]
    fn count_above_five_is_rejected() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrap {
            #[command(flatten)]
            cmd: GenerateCmd,
        }

        let ok = Wrap::try_parse_from(["gen", "--asin", "B08N5WRWNW", "--count", "5"]).unwrap();
        assert_eq!(ok.cmd.count, 5);
        assert_eq!(Wrap::try_parse_from(["gen", "--asin", "B08N5WRWNW"]).unwrap().cmd.count, DEFAULT_BULLET_COUNT);
        assert!(Wrap::try_parse_from(["gen", "--asin", "B08N5WRWNW", "--count", "8"]).is_err());
    }

    #[test]
    fn record_file_loads_with_missing_fields_defaulted() {
        let path = std::env::temp_dir().join(format!("listing-gen-record-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"title": "Wireless Headphones", "brand": "TechSound"}"#).unwrap();
        let record = load_record(&path).unwrap();
        assert_eq!(record.brand, "TechSound");
        assert!(record.feature_bullets.is_empty());
        assert_eq!(record.rating, 0.0);
        std::fs::remove_file(path).ok();
    }
}
