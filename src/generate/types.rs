use serde::Serialize;

use crate::listing::{Backend, ContentKind, Language};

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LanguageArg {
    #[value(name = "en")] En,
    #[value(name = "zh")] Zh,
    #[value(name = "both")] Both,
}

impl LanguageArg {
    pub fn languages(self) -> Vec<Language> {
        match self {
            LanguageArg::En => vec![Language::English],
            LanguageArg::Zh => vec![Language::Chinese],
            LanguageArg::Both => Language::ALL.to_vec(),
        }
    }
}

// Dry-run view: what would be sent, per language and content kind
#[derive(Serialize)]
pub struct PromptPlan {
    pub language: Language,
    pub kind: ContentKind,
    pub max_tokens: u32,
    pub system: &'static str,
    pub user: String,
}

#[derive(Serialize)]
pub struct GeneratePlan {
    pub backend: Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub source: String,
    pub placeholder: bool,
    pub count: usize,
    pub prompts: Vec<PromptPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_expands_to_english_then_chinese() {
        assert_eq!(LanguageArg::Both.languages(), vec![Language::English, Language::Chinese]);
        assert_eq!(LanguageArg::Zh.languages(), vec![Language::Chinese]);
    }
}
