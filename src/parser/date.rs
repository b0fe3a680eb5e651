//! Date extraction with reference-date-relative year inference.
//!
//! "Today" is an injected reference date, never wall-clock time, so parses
//! are deterministic and testable.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::lexicon::{contains_category_keyword, window_after, window_before};
use crate::types::{DATE_CATEGORY_GUARD_CHARS, DATE_CONTEXT_WINDOW_CHARS};

static FULL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(20\d{2})[.\-/](\d{1,2})[.\-/](\d{1,2})").expect("valid regex"));
static MONTH_DAY_KOREAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s*월\s*(\d{1,2})\s*일").expect("valid regex"));
static MONTH_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[.\-/](\d{1,2})").expect("valid regex"));

/// Words that mark a bare M/D token as an actual date.
const DATE_CLUES: [&str; 16] = [
    "본식", "예식", "결혼", "촬영", "예약", "일정", "리허설", "청첩", "피팅", "세레모니",
    "시간", "오전", "오후", "PM", "AM", "웨딩",
];

fn infer_year(month: u32, day: u32, today: NaiveDate) -> i32 {
    use chrono::Datelike;
    let year = today.year();
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(candidate) if candidate < today => year + 1,
        _ => year,
    }
}

/// A bare M/D needs a date-context clue nearby to count as a date.
fn has_date_context(text: &str, start: usize, end: usize) -> bool {
    let before = window_before(text, start, DATE_CONTEXT_WINDOW_CHARS);
    let after = window_after(text, end, DATE_CONTEXT_WINDOW_CHARS);
    let near = format!("{before}{after}");
    DATE_CLUES.iter().any(|clue| near.contains(clue)) || near.contains('월') || near.contains('일')
}

/// `스튜디오 10/26` is a price-like fraction, not a date.
fn preceded_by_category(text: &str, start: usize) -> bool {
    contains_category_keyword(window_before(text, start, DATE_CATEGORY_GUARD_CHARS))
}

fn push_date(out: &mut Vec<String>, year: i32, month: u32, day: u32) {
    if NaiveDate::from_ymd_opt(year, month, day).is_some() {
        let iso = format!("{year:04}-{month:02}-{day:02}");
        if !out.contains(&iso) {
            out.push(iso);
        }
    }
}

/// Extract ISO dates from `text`, deduplicated, discovery order.
///
/// Recognized forms, in priority order: `YYYY.MM.DD` (also `-`/`/`),
/// `M월 D일` (year inferred), and bare `M/D` gated on nearby date context.
/// Inferred years roll forward when the date would land before `today`.
pub fn extract_dates(text: &str, today: NaiveDate) -> Vec<String> {
    let mut out = Vec::new();

    for c in FULL_RE.captures_iter(text) {
        let (y, m, d) = (num(&c[1]), num32(&c[2]), num32(&c[3]));
        push_date(&mut out, y, m, d);
    }
    for c in MONTH_DAY_KOREAN_RE.captures_iter(text) {
        let (m, d) = (num32(&c[1]), num32(&c[2]));
        push_date(&mut out, infer_year(m, d, today), m, d);
    }
    for c in MONTH_DAY_RE.captures_iter(text) {
        let whole = c.get(0).expect("group 0");
        if !has_date_context(text, whole.start(), whole.end()) {
            continue;
        }
        if preceded_by_category(text, whole.start()) {
            continue;
        }
        let (m, d) = (num32(&c[1]), num32(&c[2]));
        push_date(&mut out, infer_year(m, d, today), m, d);
    }

    out
}

fn num(s: &str) -> i32 {
    s.parse().unwrap_or(0)
}

fn num32(s: &str) -> u32 {
    s.parse().unwrap_or(0)
}
