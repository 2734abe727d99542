use super::{ContentKind, Language};
use crate::llm::{ChatCompletionRequest, ChatMessage};
use crate::product::ProductRecord;

const TEMPERATURE: f32 = 0.7;

pub fn system_message(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Title => "You are an expert at creating compelling Amazon product titles.",
        ContentKind::Bullets => "You are an expert at creating compelling Amazon product bullet points.",
        ContentKind::Description => "You are an expert at creating compelling Amazon product descriptions.",
    }
}

pub fn max_tokens(kind: ContentKind) -> u32 {
    match kind {
        ContentKind::Title => 100,
        ContentKind::Bullets => 300,
        ContentKind::Description => 500,
    }
}

pub fn user_prompt(record: &ProductRecord, kind: ContentKind, language: Language, count: usize) -> String {
    let lang = language.display_name();
    let title = or_na(&record.title);
    let brand = or_na(&record.brand);

    match kind {
        ContentKind::Title => format!(
            "Create a compelling {lang} Amazon product title based on the following information:\n\n\
             Product Information:\n\
             - Original Title: {title}\n\
             - Brand: {brand}\n\
             - Key Features: {features}\n\
             - Description: {desc}...\n\n\
             Requirements:\n\
             - Include key features and specifications\n\
             - Use compelling adjectives\n\
             - Keep it under 200 characters\n\
             - Optimize for search (include relevant keywords)\n\
             - Make it attractive to customers\n\n\
             Generated {lang} Title:",
            features = features(record, 3),
            desc = excerpt(&record.description, 200),
        ),
        ContentKind::Bullets => format!(
            "Create {count} compelling {lang} Amazon product bullet points based on the following information:\n\n\
             Product Information:\n\
             - Original Title: {title}\n\
             - Brand: {brand}\n\
             - Original Bullets: {features}\n\
             - Description: {desc}...\n\n\
             Requirements:\n\
             - Focus on benefits rather than just features\n\
             - Use power words and adjectives\n\
             - Keep each point under 500 characters\n\
             - Start each point with a capital letter\n\
             - Make them scannable and easy to read\n\
             - Highlight unique selling points\n\n\
             Generated {lang} Bullet Points (each on a new line):",
            features = features(record, usize::MAX),
            desc = excerpt(&record.description, 300),
        ),
        ContentKind::Description => format!(
            "Create a compelling {lang} Amazon product description based on the following information:\n\n\
             Product Information:\n\
             - Original Title: {title}\n\
             - Brand: {brand}\n\
             - Original Bullets: {features}\n\
             - Description: {desc}...\n\n\
             Requirements:\n\
             - Expand on the key features and benefits\n\
             - Include usage scenarios and target audience\n\
             - Use persuasive language\n\
             - Structure with paragraphs\n\
             - Keep it between 1000-2000 characters\n\
             - Make it SEO-friendly\n\n\
             Generated {lang} Description:",
            features = features(record, usize::MAX),
            desc = excerpt(&record.description, 500),
        ),
    }
}

pub fn request(
    record: &ProductRecord,
    kind: ContentKind,
    language: Language,
    count: usize,
    model: Option<String>,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage::system(system_message(kind)),
            ChatMessage::user(user_prompt(record, kind, language, count)),
        ],
        max_tokens: Some(max_tokens(kind)),
        temperature: Some(TEMPERATURE),
    }
}

fn or_na(s: &str) -> &str {
    if s.trim().is_empty() { "N/A" } else { s.trim() }
}

fn features(record: &ProductRecord, take: usize) -> String {
    if record.feature_bullets.is_empty() {
        return "N/A".to_string();
    }
    record.feature_bullets.iter().take(take).map(String::as_str).collect::<Vec<_>>().join(", ")
}

// char-based so multi-byte text never splits mid-codepoint
fn excerpt(s: &str, max_chars: usize) -> String {
    let s = or_na(s);
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        ProductRecord {
            title: "Wireless Headphones".into(),
            brand: "TechSound".into(),
            feature_bullets: vec!["Bluetooth 5.0".into(), "ANC".into(), "30h battery".into(), "Foldable".into()],
            description: "d".repeat(600),
            ..Default::default()
        }
    }

    #[test]
    fn title_prompt_uses_first_three_features_and_short_excerpt() {
        let p = user_prompt(&record(), ContentKind::Title, Language::Chinese, 5);
        assert!(p.starts_with("Create a compelling Chinese Amazon product title"));
        assert!(p.contains("- Key Features: Bluetooth 5.0, ANC, 30h battery\n"));
        assert!(p.contains(&format!("- Description: {}...\n", "d".repeat(200))));
        assert!(p.ends_with("Generated Chinese Title:"));
    }

    #[test]
    fn bullet_prompt_asks_for_count() {
        let p = user_prompt(&record(), ContentKind::Bullets, Language::English, 4);
        assert!(p.starts_with("Create 4 compelling English Amazon product bullet points"));
        assert!(p.contains("Original Bullets: Bluetooth 5.0, ANC, 30h battery, Foldable"));
    }

    #[test]
    fn empty_record_fields_become_na() {
        let p = user_prompt(&ProductRecord::default(), ContentKind::Description, Language::English, 5);
        assert!(p.contains("- Original Title: N/A\n"));
        assert!(p.contains("- Original Bullets: N/A\n"));
        assert!(p.contains("- Description: N/A...\n"));
    }

    #[test]
    fn request_carries_budget_and_temperature() {
        let req = request(&record(), ContentKind::Description, Language::English, 5, Some("m".into()));
        assert_eq!(req.max_tokens, Some(500));
        assert_eq!(req.temperature, Some(0.7));
        assert_eq!(req.model.as_deref(), Some("m"));
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].content, system_message(ContentKind::Description));
    }

    #[test]
    fn excerpt_counts_chars_not_bytes() {
        assert_eq!(excerpt("产品描述很长", 2), "产品");
    }
}
