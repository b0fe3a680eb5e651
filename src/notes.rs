//! Structured view of the composite budget-preference `notes` field.
//!
//! The stored column is a legacy composite string like
//! `상담 예약함 | 지역:청담역,강남역`. Internally the note is a structured
//! record; the composite form is produced/consumed only at the storage
//! boundary, which removes the substring surgery from the merge path while
//! keeping the external format.

use once_cell::sync::Lazy;
use regex::Regex;

static REGION_SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" ?\|? ?지역:[^|]+").expect("valid regex"));
static REGION_LIST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"지역:([^|]+)").expect("valid regex"));

/// A budget-preference note split into its free text and machine-managed
/// region list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionNote {
    pub free_text: Option<String>,
    pub regions: Vec<String>,
}

impl RegionNote {
    /// Parse the legacy composite string.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Self::default(),
        };
        let regions = REGION_LIST_RE
            .captures(raw)
            .map(|c| {
                c[1].split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let free = REGION_SEGMENT_RE.replace_all(raw, "").trim().to_string();
        Self {
            free_text: if free.is_empty() { None } else { Some(free) },
            regions: normalize_regions(regions),
        }
    }

    /// Replace the region list wholesale (never unioned with the old one),
    /// preserving the free text.
    pub fn replace_regions(&mut self, regions: &[String]) {
        self.regions = normalize_regions(regions.to_vec());
    }

    /// Serialize back to the composite storage form. `None` when the note
    /// carries nothing.
    pub fn to_composite(&self) -> Option<String> {
        let region_part = if self.regions.is_empty() {
            None
        } else {
            Some(format!("지역:{}", self.regions.join(",")))
        };
        match (self.free_text.as_deref(), region_part) {
            (Some(free), Some(region)) => Some(format!("{free} | {region}")),
            (Some(free), None) => Some(free.to_string()),
            (None, Some(region)) => Some(region),
            (None, None) => None,
        }
    }
}

/// Drop exact duplicates, then drop any region that is a strict prefix of
/// another surviving region (`압구` goes when `압구정역` is present).
pub fn normalize_regions(regions: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for r in regions {
        if !unique.contains(&r) {
            unique.push(r);
        }
    }
    unique
        .iter()
        .filter(|r| !unique.iter().any(|other| *other != **r && other.starts_with(r.as_str())))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_composite_with_free_text_and_regions() {
        let note = RegionNote::parse(Some("상담 예약함 | 지역:청담역,강남역"));
        assert_eq!(note.free_text.as_deref(), Some("상담 예약함"));
        assert_eq!(note.regions, vec!["청담역", "강남역"]);
    }

    #[test]
    fn parse_region_only() {
        let note = RegionNote::parse(Some("지역:홍대입구역"));
        assert_eq!(note.free_text, None);
        assert_eq!(note.regions, vec!["홍대입구역"]);
    }

    #[test]
    fn replace_discards_old_regions_entirely() {
        let mut note = RegionNote::parse(Some("상담 예약함 | 지역:홍대입구역"));
        note.replace_regions(&["청담역".to_string()]);
        assert_eq!(note.to_composite().unwrap(), "상담 예약함 | 지역:청담역");
    }

    #[test]
    fn round_trip_preserves_composite_form() {
        for raw in ["지역:청담역", "상담 예약함 | 지역:청담역,강남역", "상담 예약함"] {
            let note = RegionNote::parse(Some(raw));
            assert_eq!(note.to_composite().as_deref(), Some(raw));
        }
        assert_eq!(RegionNote::parse(None).to_composite(), None);
    }

    #[test]
    fn prefix_duplicates_are_dropped() {
        let normalized = normalize_regions(vec![
            "압구".to_string(),
            "압구정역".to_string(),
            "압구정역".to_string(),
        ]);
        assert_eq!(normalized, vec!["압구정역"]);
    }
}
