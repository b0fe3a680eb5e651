//! Amount normalization and the amount-span pattern cascade.
//!
//! Amounts are normalized to manwon (10,000 won). The cascade is an ordered
//! list of (pattern, handler) pairs tried first-match-wins; the ordering is
//! load-bearing: `120±10만원` must be consumed by the plus-minus pattern
//! before the plain range pattern can misread it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::AmountKind;

/// Unit alternation, longest marker first so `백만원` never half-matches as `원`.
const UNIT: &str = "백만원|백만|천원|만원|억원|만|억|원";
const NUM: &str = r"\d+(?:\.\d+)?";

static PLUSMINUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"({NUM})±({NUM})({UNIT})?")).expect("valid regex"));
static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"({NUM})[~\-]({NUM})({UNIT})?")).expect("valid regex"));
static LE_AFTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"({NUM})({UNIT})?(?:이하|최대|상한|까지)")).expect("valid regex")
});
static GE_AFTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"({NUM})({UNIT})?(?:이상|최소|하한|부터)")).expect("valid regex")
});
static LE_BEFORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?:최대|상한|이하|까지)({NUM})({UNIT})?")).expect("valid regex")
});
static GE_BEFORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?:최소|하한|이상|부터)({NUM})({UNIT})?")).expect("valid regex")
});
static SINGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"({NUM})({UNIT})?")).expect("valid regex"));

/// Convert a numeric value with an optional unit marker to manwon.
///
/// No unit means the value is already in manwon. Kept as `f64` end to end;
/// integer rounding happens only at final emission so range midpoints do not
/// accumulate rounding error.
pub fn to_manwon(value: f64, unit: Option<&str>) -> f64 {
    match unit {
        None => value,
        Some(u) => match u.trim() {
            "만원" | "만" => value,
            "원" => value / 10_000.0,
            "천원" => value * 1_000.0 / 10_000.0,
            "백만원" | "백만" => value * 100.0,
            "억" | "억원" => value * 10_000.0,
            _ => value,
        },
    }
}

/// A parsed amount span in manwon, still unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountSpan {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub kind: AmountKind,
}

impl AmountSpan {
    const NONE: AmountSpan = AmountSpan {
        min: None,
        max: None,
        kind: AmountKind::None,
    };
}

fn num(s: &str) -> f64 {
    s.parse().unwrap_or(0.0)
}

/// Detect one amount span in a short text window.
///
/// Whitespace inside the window is ignored. Patterns are tried in priority
/// order; the first match wins.
pub fn parse_amount_span(window: &str) -> AmountSpan {
    let t: String = window.chars().filter(|c| !c.is_whitespace()).collect();
    if t.is_empty() {
        return AmountSpan::NONE;
    }

    if let Some(c) = PLUSMINUS_RE.captures(&t) {
        let base = num(&c[1]);
        let delta = to_manwon(num(&c[2]), c.get(3).map(|m| m.as_str()));
        return AmountSpan {
            min: Some((base - delta).max(0.0)),
            max: Some(base + delta),
            kind: AmountKind::PlusMinus,
        };
    }
    if let Some(c) = RANGE_RE.captures(&t) {
        let a = num(&c[1]);
        let b = to_manwon(num(&c[2]), c.get(3).map(|m| m.as_str()));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        return AmountSpan {
            min: Some(lo),
            max: Some(hi),
            kind: AmountKind::Range,
        };
    }
    if let Some(c) = LE_AFTER_RE.captures(&t) {
        let hi = to_manwon(num(&c[1]), c.get(2).map(|m| m.as_str()));
        return AmountSpan {
            min: None,
            max: Some(hi),
            kind: AmountKind::Le,
        };
    }
    if let Some(c) = GE_AFTER_RE.captures(&t) {
        let lo = to_manwon(num(&c[1]), c.get(2).map(|m| m.as_str()));
        return AmountSpan {
            min: Some(lo),
            max: None,
            kind: AmountKind::Ge,
        };
    }
    if let Some(c) = LE_BEFORE_RE.captures(&t) {
        let hi = to_manwon(num(&c[1]), c.get(2).map(|m| m.as_str()));
        return AmountSpan {
            min: None,
            max: Some(hi),
            kind: AmountKind::Le,
        };
    }
    if let Some(c) = GE_BEFORE_RE.captures(&t) {
        let lo = to_manwon(num(&c[1]), c.get(2).map(|m| m.as_str()));
        return AmountSpan {
            min: Some(lo),
            max: None,
            kind: AmountKind::Ge,
        };
    }
    if let Some(c) = SINGLE_RE.captures(&t) {
        let v = to_manwon(num(&c[1]), c.get(2).map(|m| m.as_str()));
        return AmountSpan {
            min: Some(v),
            max: Some(v),
            kind: AmountKind::Single,
        };
    }
    AmountSpan::NONE
}
