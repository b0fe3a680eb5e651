//! Scoped region extraction.
//!
//! Location-like tokens are suffix-marked (역/권/구/동). A token with a
//! category keyword in the preceding few characters is bound to that
//! category; otherwise it is a global region for the whole profile.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::lexicon::{contains_category_keyword, first_category_in, window_before};
use crate::types::{Category, REGION_BIND_WINDOW_CHARS, REGION_CATEGORY_WINDOW_CHARS};

// Greedy stem so `홍대입구역` wins over `홍대입구`. The regex crate has no
// lookbehind/lookahead; greedy backtracking over the stem gives the same
// tokens for suffixed place names followed by particles (청담역으로 → 청담역).
static REGION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[가-힣A-Za-z0-9]+(?:역|권|구|동)").expect("valid regex"));

/// Extract global and category-bound regions from `text`.
///
/// Both lists are deduplicated and keep discovery order. The fallback that
/// maps a global region onto mentioned-but-unbound categories belongs to the
/// commit layer, not here.
pub fn extract_regions(text: &str) -> (Vec<String>, BTreeMap<Category, Vec<String>>) {
    let mut globals: Vec<String> = Vec::new();
    let mut by_category: BTreeMap<Category, Vec<String>> = BTreeMap::new();

    for m in REGION_RE.find_iter(text) {
        let token = m.as_str().to_string();
        let bound = contains_category_keyword(window_before(text, m.start(), REGION_BIND_WINDOW_CHARS));
        if bound {
            let picker = window_before(text, m.start(), REGION_CATEGORY_WINDOW_CHARS);
            if let Some(cat) = first_category_in(picker) {
                let list = by_category.entry(cat).or_default();
                if !list.contains(&token) {
                    list.push(token);
                }
                continue;
            }
        }
        if !globals.contains(&token) {
            globals.push(token);
        }
    }

    (globals, by_category)
}
