//! Windowed per-category budget extraction.
//!
//! Every occurrence of every category synonym anchors a bounded trailing
//! window; the window is cut at sentence punctuation or at the next category
//! keyword so one category never reads its neighbor's amount.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::amount::{parse_amount_span, AmountSpan};
use super::lexicon::{keyword_regex, window_after};
use crate::types::{
    AmountKind, BudgetSpan, Category, IssueCode, ParseIssue, AMOUNT_WINDOW_CHARS,
};

static BOUNDARY_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?;,\n]").expect("valid regex"));

/// Trailing window after a keyword match, cut at the earliest of sentence
/// punctuation or the next category keyword.
fn window_after_keyword(text: &str, start: usize) -> &str {
    let bounded = window_after(text, start, AMOUNT_WINDOW_CHARS);
    let punct_at = BOUNDARY_PUNCT_RE.find(bounded).map(|m| m.start());
    let keyword_at = keyword_regex().find(bounded).map(|m| m.start());
    let cut = match (punct_at, keyword_at) {
        (Some(p), Some(k)) => p.min(k),
        (Some(p), None) => p,
        (None, Some(k)) => k,
        (None, None) => bounded.len(),
    };
    &bounded[..cut]
}

/// Apply the ±10% band a lone figure stands for: a single number is a rough
/// target, not an exact amount.
fn expand_single(span: AmountSpan) -> AmountSpan {
    match (span.kind, span.min) {
        (AmountKind::Single, Some(v)) => AmountSpan {
            min: Some((v * 0.9).floor().max(0.0)),
            max: Some((v * 1.1).ceil()),
            kind: AmountKind::Single,
        },
        _ => span,
    }
}

/// Extract per-category budgets from `text`.
///
/// Returns at most one budget per category (the last keyword mention in text
/// order wins) plus any minimum-floor violations as issues.
pub fn extract_budgets(text: &str) -> (Vec<BudgetSpan>, Vec<ParseIssue>) {
    let mut issues = Vec::new();
    // category -> (keyword byte position, span)
    let mut last_per_category: std::collections::BTreeMap<Category, (usize, BudgetSpan)> =
        std::collections::BTreeMap::new();

    for cat in Category::ALL {
        for keyword in cat.synonyms() {
            for (pos, matched) in text.match_indices(keyword) {
                let window = window_after_keyword(text, pos + matched.len());
                let span = parse_amount_span(window);
                if span.kind == AmountKind::None {
                    continue;
                }
                let span = expand_single(span);

                let floor = cat.min_floor_manwon() as f64;
                let decisive = span.max.or(span.min);
                if let Some(v) = decisive {
                    if v < floor {
                        debug!(category = %cat, observed = v, floor, "budget below minimum floor");
                        issues.push(ParseIssue {
                            code: IssueCode::MinTooLow,
                            category: cat,
                            min_required: floor as i64,
                            observed: v.round() as i64,
                            context: window.trim().to_string(),
                            suggestion: format!(
                                "{} 예산은 최소 {}만원 이상으로 다시 입력해 주세요.",
                                cat.label_korean(),
                                floor as i64
                            ),
                        });
                        continue;
                    }
                }
                // Only the min is low: clamp up instead of rejecting.
                let min = span.min.map(|lo| if lo < floor { floor } else { lo });

                let entry = BudgetSpan {
                    category: cat,
                    min_manwon: min.map(|v| v.round() as i64),
                    max_manwon: span.max.map(|v| v.round() as i64),
                    matched_keyword: (*matched).to_string(),
                    kind: span.kind,
                };
                let keep = match last_per_category.get(&cat) {
                    Some((prev_pos, _)) => pos >= *prev_pos,
                    None => true,
                };
                if keep {
                    last_per_category.insert(cat, (pos, entry));
                }
            }
        }
    }

    let mut budgets: Vec<(usize, BudgetSpan)> = last_per_category.into_values().collect();
    budgets.sort_by_key(|(pos, _)| *pos);
    (budgets.into_iter().map(|(_, b)| b).collect(), issues)
}
