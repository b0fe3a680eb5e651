//! Category keyword lexicon and text-window helpers.
//!
//! All category synonyms are combined into one longest-match-first regex so
//! that window cutting and mention scanning never stop at a partial keyword
//! (e.g. `스냅` inside `스냅촬영`).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Category;

/// Every synonym with its category, sorted longest-first.
static SYNONYMS: Lazy<Vec<(&'static str, Category)>> = Lazy::new(|| {
    let mut all: Vec<(&'static str, Category)> = Category::ALL
        .iter()
        .flat_map(|cat| cat.synonyms().iter().map(|s| (*s, *cat)))
        .collect();
    all.sort_by_key(|(s, _)| std::cmp::Reverse(s.chars().count()));
    all
});

static SYNONYM_TO_CATEGORY: Lazy<HashMap<&'static str, Category>> =
    Lazy::new(|| SYNONYMS.iter().copied().collect());

/// Combined regex over all synonyms, longest alternative first.
static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = SYNONYMS
        .iter()
        .map(|(s, _)| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern).expect("valid regex")
});

/// The combined category-keyword regex.
pub fn keyword_regex() -> &'static Regex {
    &KEYWORD_RE
}

/// Category for an exact synonym match.
pub fn category_for_keyword(keyword: &str) -> Option<Category> {
    SYNONYM_TO_CATEGORY.get(keyword).copied()
}

/// Categories whose keywords occur in `text`, discovery order, deduplicated.
pub fn mentioned_categories(text: &str) -> Vec<Category> {
    let mut out = Vec::new();
    for m in KEYWORD_RE.find_iter(text) {
        if let Some(cat) = category_for_keyword(m.as_str()) {
            if !out.contains(&cat) {
                out.push(cat);
            }
        }
    }
    out
}

/// True if any category keyword occurs in `text`.
pub fn contains_category_keyword(text: &str) -> bool {
    KEYWORD_RE.is_match(text)
}

/// First category whose synonym occurs in `text`, in canonical category order.
pub fn first_category_in(text: &str) -> Option<Category> {
    Category::ALL
        .iter()
        .copied()
        .find(|cat| cat.synonyms().iter().any(|s| text.contains(s)))
}

/// Slice of up to `chars` characters ending at byte offset `end`.
pub fn window_before(text: &str, end: usize, chars: usize) -> &str {
    if chars == 0 {
        return "";
    }
    let start = text[..end]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[start..end]
}

/// Slice of up to `chars` characters starting at byte offset `start`.
pub fn window_after(text: &str, start: usize, chars: usize) -> &str {
    let end = text[start..]
        .char_indices()
        .nth(chars)
        .map(|(i, _)| start + i)
        .unwrap_or(text.len());
    &text[start..end]
}
