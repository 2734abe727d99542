//! Content generation: bilingual titles, bullet points and descriptions
//! for a scraped product. Always returns something; a backend failure
//! falls through to the fixed templates.

pub mod bullets;
pub mod prompt;
pub mod template;

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use crate::llm::{LlmClient, LlmConfig, OpenAiClient};
use crate::product::ProductRecord;
use crate::telemetry;
use crate::telemetry::ops::generate::Phase as GeneratePhase;

pub use bullets::parse_bullet_points;

pub const DEFAULT_BULLET_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Chinese];

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Chinese => "chinese",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "Chinese",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "zh" | "cn" | "zh-cn" | "chinese" => Ok(Language::Chinese),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Title,
    Bullets,
    Description,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Title, ContentKind::Bullets, ContentKind::Description];

    pub fn name(&self) -> &'static str {
        match self {
            ContentKind::Title => "title",
            ContentKind::Bullets => "bullets",
            ContentKind::Description => "description",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeneratedContent {
    Text(String),
    Bullets(Vec<String>),
}

/// Which text-generation backend to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hosted OpenAI chat completions (needs OPENAI_API_KEY)
    #[value(name = "openai")]
    OpenAi,
    /// OpenAI-compatible server on this machine
    Local,
    /// Fixed templates only, no network
    Template,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListingCopy {
    pub language: Language,
    pub title: String,
    pub bullets: Vec<String>,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Listing {
    copies: Vec<ListingCopy>,
}

impl Listing {
    pub fn copies(&self) -> &[ListingCopy] { &self.copies }
}

pub struct ListingGenerator {
    client: Option<Arc<dyn LlmClient>>,
    model: Option<String>,
}

impl ListingGenerator {
    pub fn template() -> Self { Self { client: None, model: None } }

    pub fn with_client(client: Arc<dyn LlmClient>, model: Option<String>) -> Self {
        Self { client: Some(client), model }
    }

    /// Build the generator for a backend. A backend that cannot be set up
    /// (no API key, client init failure) degrades to templates with a warning.
    pub fn from_backend(backend: Backend, model: Option<String>) -> Self {
        let log = telemetry::generate();
        let cfg = match backend {
            Backend::Template => return Self::template(),
            Backend::OpenAi => LlmConfig::openai_from_env(),
            Backend::Local => LlmConfig::local_from_env(),
        };
        if backend == Backend::OpenAi && cfg.api_key.is_none() {
            log.warn("⚠️  OPENAI_API_KEY is not set — falling back to template generation");
            return Self::template();
        }
        match OpenAiClient::new(cfg) {
            Ok(client) => Self::with_client(Arc::new(client), model),
            Err(err) => {
                log.warn_kv("⚠️  could not build LLM client — falling back to template generation", [("error", err.to_string())]);
                Self::template()
            }
        }
    }

    pub fn is_template(&self) -> bool { self.client.is_none() }

    pub async fn generate(
        &self,
        record: &ProductRecord,
        kind: ContentKind,
        language: Language,
        count: Option<usize>,
    ) -> GeneratedContent {
        match kind {
            ContentKind::Title => GeneratedContent::Text(self.title(record, language).await),
            ContentKind::Bullets => {
                GeneratedContent::Bullets(self.bullets(record, language, count.unwrap_or(DEFAULT_BULLET_COUNT)).await)
            }
            ContentKind::Description => GeneratedContent::Text(self.description(record, language).await),
        }
    }

    pub async fn title(&self, record: &ProductRecord, language: Language) -> String {
        match self.complete(record, ContentKind::Title, language, DEFAULT_BULLET_COUNT).await {
            Some(text) => text,
            None => template::title(record, language),
        }
    }

    pub async fn bullets(&self, record: &ProductRecord, language: Language, count: usize) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }
        let parsed = self
            .complete(record, ContentKind::Bullets, language, count)
            .await
            .map(|raw| parse_bullet_points(&raw, count))
            .filter(|b| !b.is_empty());
        parsed.unwrap_or_else(|| template::bullets(language, count))
    }

    pub async fn description(&self, record: &ProductRecord, language: Language) -> String {
        match self.complete(record, ContentKind::Description, language, DEFAULT_BULLET_COUNT).await {
            Some(text) => text,
            None => template::description(record, language),
        }
    }

    /// Title, bullets and description for each requested language.
    pub async fn listing(&self, record: &ProductRecord, languages: &[Language], count: usize) -> Listing {
        let mut copies = Vec::with_capacity(languages.len());
        for &language in languages {
            let mut copy = ListingCopy { language, title: String::new(), bullets: Vec::new(), description: String::new() };
            for kind in ContentKind::ALL {
                match (kind, self.generate(record, kind, language, Some(count)).await) {
                    (ContentKind::Title, GeneratedContent::Text(text)) => copy.title = text,
                    (ContentKind::Description, GeneratedContent::Text(text)) => copy.description = text,
                    (_, GeneratedContent::Bullets(bullets)) => copy.bullets = bullets,
                    (_, GeneratedContent::Text(_)) => {}
                }
            }
            copies.push(copy);
        }
        Listing { copies }
    }

    // None means "use the template": no backend, or the backend failed.
    async fn complete(&self, record: &ProductRecord, kind: ContentKind, language: Language, count: usize) -> Option<String> {
        let client = self.client.as_ref()?;
        let log = telemetry::generate();
        let request = prompt::request(record, kind, language, count, self.model.clone());
        let span = log.span_kv(&GeneratePhase::CallLlm, [("kind", kind.name().to_string()), ("language", language.name().to_string())]);

        match client.chat_completion(request).instrument(span).await {
            Ok(resp) if !resp.content.trim().is_empty() => {
                tracing::debug!(model = ?resp.model, total_tokens = ?resp.total_tokens, kind = kind.name(), "completion");
                Some(resp.content.trim().to_string())
            }
            Ok(_) => {
                log.warn_kv("⚠️  empty completion — using template", [("kind", kind.name().to_string())]);
                None
            }
            Err(err) => {
                log.warn_kv(
                    "⚠️  LLM call failed — using template",
                    [("kind", kind.name().to_string()), ("language", language.name().to_string()), ("error", err.to_string())],
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockClient;
    use crate::llm::LlmError;

    fn headphones() -> ProductRecord {
        ProductRecord {
            title: "Wireless Headphones".into(),
            brand: "TechSound".into(),
            feature_bullets: vec![
                "Bluetooth 5.0 for stable connection".into(),
                "Noise cancellation technology".into(),
                "30-hour battery life".into(),
                "Comfortable over-ear design".into(),
                "Built-in microphone for calls".into(),
            ],
            description: "Premium wireless headphones with advanced noise cancellation.".into(),
            ..Default::default()
        }
    }

    #[test]
    fn language_parsing_accepts_codes_and_names() {
        assert_eq!("chinese".parse::<Language>(), Ok(Language::Chinese));
        assert_eq!("ZH".parse::<Language>(), Ok(Language::Chinese));
        assert_eq!("english".parse::<Language>(), Ok(Language::English));
        assert!("klingon".parse::<Language>().is_err());
    }

    #[tokio::test]
    async fn chinese_listing_without_backend_uses_templates() {
        let generator = ListingGenerator::template();
        let language: Language = "chinese".parse().unwrap();

        let title = generator.generate(&headphones(), ContentKind::Title, language, None).await;
        let GeneratedContent::Text(title) = title else { panic!("title should be text") };
        assert!(title.contains("TechSound"));
        assert!(title.starts_with("【升级版】"));

        let bullets = generator.generate(&headphones(), ContentKind::Bullets, language, None).await;
        let GeneratedContent::Bullets(bullets) = bullets else { panic!("bullets should be a list") };
        assert_eq!(bullets, template::bullets(Language::Chinese, 5));
        assert!(bullets.iter().all(|b| !b.is_empty()));
    }

    #[tokio::test]
    async fn failing_backend_degrades_to_templates() {
        let mock = Arc::new(MockClient::new());
        mock.push_response(Err(LlmError::Timeout));
        mock.push_response(Err(LlmError::EmptyCompletion));
        mock.push_response(Err(LlmError::EmptyMessages));
        let generator = ListingGenerator::with_client(mock.clone(), None);

        let listing = generator.listing(&headphones(), &[Language::Chinese], 5).await;
        let zh = &listing.copies()[0];
        assert_eq!(zh.title, template::title(&headphones(), Language::Chinese));
        assert_eq!(zh.bullets.len(), 5);
        assert_eq!(zh.description, template::description(&headphones(), Language::Chinese));
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn backend_bullets_are_parsed_and_capped() {
        let mock = Arc::new(MockClient::new());
        mock.push_text("1. Immersive sound anywhere\n2. All-day comfort\n3. Thirty hours of play\n4. Calls that sound clear\n5. Folds flat for travel\n6. Extra line");
        let generator = ListingGenerator::with_client(mock.clone(), Some("gpt-test".into()));

        let bullets = generator.bullets(&headphones(), Language::English, 4).await;
        assert_eq!(bullets, vec!["Immersive sound anywhere", "All-day comfort", "Thirty hours of play", "Calls that sound clear"]);

        let call = &mock.calls()[0];
        assert_eq!(call.model.as_deref(), Some("gpt-test"));
        assert_eq!(call.max_tokens, Some(300));
        assert!(call.messages[1].content.starts_with("Create 4 compelling English"));
    }

    #[tokio::test]
    async fn backend_bullets_never_exceed_five() {
        let mock = Arc::new(MockClient::new());
        let raw = (1..=8).map(|i| format!("{i}. Selling point number {i}")).collect::<Vec<_>>().join("\n");
        mock.push_text(&raw);
        let generator = ListingGenerator::with_client(mock.clone(), None);

        let bullets = generator.bullets(&headphones(), Language::English, 8).await;
        assert_eq!(bullets.len(), 5);
        assert_eq!(template::bullets(Language::English, 8).len(), 5);
    }

    #[tokio::test]
    async fn backend_title_is_trimmed() {
        let mock = Arc::new(MockClient::new());
        mock.push_text("  TechSound Wireless Headphones, 30H Battery \n");
        let generator = ListingGenerator::with_client(mock, None);
        assert_eq!(generator.title(&headphones(), Language::English).await, "TechSound Wireless Headphones, 30H Battery");
    }

    #[tokio::test]
    async fn zero_count_skips_backend() {
        let mock = Arc::new(MockClient::new());
        let generator = ListingGenerator::with_client(mock.clone(), None);
        assert!(generator.bullets(&headphones(), Language::English, 0).await.is_empty());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn template_backend_needs_no_client() {
        assert!(ListingGenerator::from_backend(Backend::Template, None).is_template());
    }
}
