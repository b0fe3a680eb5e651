//! Human-readable Korean summary of the persisted plan.

use crate::notes::RegionNote;
use crate::types::{BudgetPref, ProfileSnapshot};

fn format_manwon(v: Option<i64>) -> String {
    match v {
        Some(v) => format!("{v}만원"),
        None => "-".to_string(),
    }
}

fn budget_line(pref: &BudgetPref) -> String {
    let range = match (pref.min_manwon, pref.max_manwon) {
        (Some(lo), Some(hi)) => format!("{} ~ {}", format_manwon(Some(lo)), format_manwon(Some(hi))),
        (Some(lo), None) => format!("최소 {}", format_manwon(Some(lo))),
        (None, Some(hi)) => format!("최대 {}", format_manwon(Some(hi))),
        (None, None) => "-".to_string(),
    };
    let note = RegionNote::parse(pref.notes.as_deref());
    let label = pref.category.label_korean();
    if note.regions.is_empty() {
        format!("{label}: {range}")
    } else {
        format!("{label}: {range} (지역:{})", note.regions.join(","))
    }
}

/// Render the current state to stable, human-readable Korean text: ceremony
/// date, default region, and a semicolon-joined list of per-category budget
/// ranges with any bound region annotation.
pub fn render_summary(snapshot: &ProfileSnapshot) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(date) = snapshot.wedding.as_ref().and_then(|w| w.date.as_deref()) {
        parts.push(format!("예식: {date}"));
    }
    if let Some(region) = snapshot.region.as_deref() {
        parts.push(format!("지역: {region}"));
    }
    if !snapshot.budgets.is_empty() {
        let lines: Vec<String> = snapshot.budgets.iter().map(budget_line).collect();
        parts.push(format!("예산: {}", lines.join("; ")));
    }

    if parts.is_empty() {
        "요약 정보 없음".to_string()
    } else {
        parts.join(" / ")
    }
}
