use std::sync::LazyLock;

use regex::Regex;

use crate::product::types::MAX_BULLETS;

// "1. ", "2) ", "- ", "* ", "• ". A bare leading number is bullet text.
static LINE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+[.)]\s*|[-*•+]+\s*)").expect("prefix pattern"));
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?。！？]+").expect("sentence pattern"));

const MIN_LINE_CHARS: usize = 5;
const MIN_SENTENCE_CHARS: usize = 10;

/// Split raw model output into at most `count` bullet lines, never more
/// than five.
///
/// One bullet per line is the expected shape. When that yields fewer than
/// two usable lines the text is treated as prose and split into sentences.
pub fn parse_bullet_points(text: &str, count: usize) -> Vec<String> {
    let mut bullets: Vec<String> = text
        .lines()
        .map(strip_line_prefix)
        .filter(|l| l.chars().count() > MIN_LINE_CHARS)
        .collect();

    if bullets.len() < 2 {
        bullets = SENTENCE_END
            .split(text)
            .map(|s| s.trim().to_string())
            .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
            .collect();
    }

    bullets.truncate(count.min(MAX_BULLETS));
    bullets
}

pub fn strip_line_prefix(line: &str) -> String {
    let line = line.trim();
    LINE_PREFIX.replace(line, "").trim().to_string()
}
