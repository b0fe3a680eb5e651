//! Wedding-ceremony event detection.

use once_cell::sync::Lazy;
use regex::Regex;

use super::region::extract_regions;
use crate::types::WeddingEvent;

/// Keywords that mark the utterance as being about the ceremony itself.
const CEREMONY_KEYWORDS: [&str; 5] = ["본식", "예식", "결혼식", "웨딩", "결혼"];

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(오전|오후)?\s*(\d{1,2})\s*시(?:\s*(\d{1,2})\s*분)?").expect("valid regex"));

/// General place name marked by a trailing particle (교대에서 → 교대).
static LOCATION_PARTICLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([가-힣A-Za-z0-9]{2,})(?:에서|으로|로|에|쪽|근처)").expect("valid regex"));

static PARTICLE_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:에서|으로|로|에|쪽|근처)$").expect("valid regex"));

/// Request words and other frequent tokens that look location-like to the
/// particle pattern but never are.
const LOCATION_STOPWORDS: [&str; 16] = [
    "바꿔줘", "바꿔", "바꾸", "해주세요", "해줘", "추천", "목록", "더", "이하", "이상",
    "결혼식", "예식", "본식", "웨딩", "날짜", "시간",
];

/// Verb/ending shapes rejected as locations.
const VERB_ENDINGS: [&str; 6] = ["합니다", "할거야", "다", "요", "줘", "해"];

fn clean_location(token: &str) -> String {
    PARTICLE_TAIL_RE.replace(token.trim(), "").trim().to_string()
}

fn extract_time(text: &str) -> Option<String> {
    let c = TIME_RE.captures(text)?;
    let meridiem = c.get(1).map(|m| m.as_str());
    let mut hour: u32 = c[2].parse().ok()?;
    let minute: u32 = c.get(3).map(|m| m.as_str().parse().ok()).flatten().unwrap_or(0);
    if hour > 23 || minute > 59 {
        return None;
    }
    match meridiem {
        Some("오후") if hour < 12 => hour += 12,
        Some("오전") if hour == 12 => hour = 0,
        _ => {}
    }
    Some(format!("{hour:02}:{minute:02}"))
}

fn extract_location(text: &str) -> Option<String> {
    // Suffix-marked regions win; fall back to particle-marked general names.
    let (globals, _) = extract_regions(text);
    if let Some(first) = globals.into_iter().next() {
        return Some(first);
    }
    for c in LOCATION_PARTICLE_RE.captures_iter(text) {
        let candidate = clean_location(&c[1]);
        if candidate.is_empty() {
            continue;
        }
        if LOCATION_STOPWORDS.contains(&candidate.as_str()) {
            continue;
        }
        if VERB_ENDINGS.iter().any(|e| candidate.ends_with(e)) {
            continue;
        }
        // Amount-like tokens (5천만원으로 …) are not places.
        if candidate.chars().any(|ch| ch.is_ascii_digit()) {
            continue;
        }
        return Some(candidate);
    }
    None
}

/// Detect the single ceremony event, if the text is about one.
///
/// Triggers when a ceremony keyword is present together with at least one of
/// a date, a time of day, or a location candidate. The first extracted date
/// becomes the event date.
pub fn detect_wedding_event(text: &str, dates: &[String]) -> Option<WeddingEvent> {
    if !CEREMONY_KEYWORDS.iter().any(|k| text.contains(k)) {
        return None;
    }
    let event = WeddingEvent {
        date: dates.first().cloned(),
        time: extract_time(text),
        location: extract_location(text),
        budget_manwon: None,
    };
    if event.is_empty() {
        return None;
    }
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_plus_date_emits_event() {
        let dates = vec!["2025-10-26".to_string()];
        let ev = detect_wedding_event("결혼식 10/26", &dates).unwrap();
        assert_eq!(ev.date.as_deref(), Some("2025-10-26"));
    }

    #[test]
    fn no_ceremony_keyword_no_event() {
        let dates = vec!["2025-10-26".to_string()];
        assert!(detect_wedding_event("스튜디오 예약은 그날로", &dates).is_none());
    }

    #[test]
    fn location_only_event_from_particle_token() {
        let ev = detect_wedding_event("예식은 교대에서 할거야", &[]).unwrap();
        assert_eq!(ev.location.as_deref(), Some("교대"));
        assert!(ev.date.is_none());
        assert!(ev.time.is_none());
    }

    #[test]
    fn verb_shaped_tokens_are_not_locations() {
        // 할거야/바꿔줘 must not be read as places.
        assert!(detect_wedding_event("예식 날짜 바꿔줘", &[]).is_none());
    }

    #[test]
    fn afternoon_time_is_normalized() {
        let ev = detect_wedding_event("본식은 오후 2시 30분", &[]).unwrap();
        assert_eq!(ev.time.as_deref(), Some("14:30"));
    }

    #[test]
    fn amount_tokens_are_not_locations() {
        assert!(detect_wedding_event("결혼 자금 5천만원으로 준비해보려고", &[]).is_none());
    }

    #[test]
    fn suffixed_region_preferred_over_particle_token() {
        let ev = detect_wedding_event("예식은 교대역 근처에서 했으면 해", &[]).unwrap();
        assert_eq!(ev.location.as_deref(), Some("교대역"));
    }
}
