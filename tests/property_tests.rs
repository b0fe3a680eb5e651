//! Property-based tests for marryroute
//!
//! These tests verify invariants that must hold for all inputs:
//! - The parser never panics
//! - Amount spans stay ordered and floor-checked
//! - Note normalization is idempotent
//!
//! Run with: cargo test --test property_tests

use proptest::prelude::*;

// ============================================================================
// PARSER ROBUSTNESS TESTS
// ============================================================================

mod parser_tests {
    use super::*;
    use chrono::NaiveDate;
    use marryroute::parser::Parser;

    fn parser() -> Parser {
        Parser::new(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
    }

    proptest! {
        /// Invariant: parse never panics on any printable input
        #[test]
        fn never_panics(s in "\\PC{0,500}") {
            let _ = parser().parse(&s);
        }

        /// Invariant: parse never panics on Korean text with digits and units
        #[test]
        fn never_panics_korean(s in "[가-힣0-9 .~±만원억천월일시분/!?,-]{0,200}") {
            let _ = parser().parse(&s);
        }

        /// Invariant: parse is deterministic for a fixed reference date
        #[test]
        fn deterministic(s in "[가-힣0-9 .~만원억월일/]{0,120}") {
            let p = parser();
            prop_assert_eq!(p.parse(&s), p.parse(&s));
        }

        /// Invariant: at most one budget per category survives
        #[test]
        fn one_budget_per_category(s in "[가-힣0-9 .~만원억!,]{0,200}") {
            let fact = parser().parse(&s);
            let mut seen = std::collections::BTreeSet::new();
            for budget in &fact.budgets {
                prop_assert!(seen.insert(budget.category));
            }
        }

        /// Invariant: emitted budgets are ordered and respect category floors
        #[test]
        fn budgets_ordered_and_floored(s in "[가-힣0-9 .~만원억!,]{0,200}") {
            let fact = parser().parse(&s);
            for budget in &fact.budgets {
                if let (Some(lo), Some(hi)) = (budget.min_manwon, budget.max_manwon) {
                    prop_assert!(lo <= hi);
                }
                let floor = budget.category.min_floor_manwon();
                prop_assert!(budget.max_manwon.or(budget.min_manwon).unwrap_or(floor) >= floor);
            }
        }

        /// Invariant: extracted dates are ISO-shaped and deduplicated
        #[test]
        fn dates_are_iso(s in "[가-힣0-9 .월일/시-]{0,150}") {
            let fact = parser().parse(&s);
            let mut seen = std::collections::BTreeSet::new();
            for date in &fact.dates {
                prop_assert!(NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
                prop_assert!(seen.insert(date.clone()));
            }
        }

        /// Invariant: yearless Korean dates never resolve to the past
        #[test]
        fn yearless_dates_roll_forward(month in 1u32..=12, day in 1u32..=28) {
            let text = format!("{month}월 {day}일에 보러 가자");
            let fact = parser().parse(&text);
            let reference = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
            for date in &fact.dates {
                let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
                prop_assert!(parsed >= reference);
            }
        }
    }
}

// ============================================================================
// AMOUNT SPAN TESTS
// ============================================================================

mod amount_tests {
    use super::*;
    use marryroute::parser::amount::{parse_amount_span, to_manwon};
    use marryroute::types::AmountKind;

    proptest! {
        /// Invariant: span detection never panics
        #[test]
        fn never_panics(s in "\\PC{0,100}") {
            let _ = parse_amount_span(&s);
        }

        /// Invariant: a detected span is ordered
        #[test]
        fn span_is_ordered(s in "[0-9 .~±만원억천이하이상]{0,60}") {
            let span = parse_amount_span(&s);
            if let (Some(lo), Some(hi)) = (span.min, span.max) {
                prop_assert!(lo <= hi);
            }
        }

        /// Invariant: whitespace inside the window does not change the result
        #[test]
        fn whitespace_insensitive(a in 1u32..10_000, b in 1u32..10_000) {
            let tight = format!("{a}~{b}만원");
            let loose = format!("{a} ~ {b} 만원");
            prop_assert_eq!(parse_amount_span(&tight), parse_amount_span(&loose));
        }

        /// Invariant: a reversed range normalizes to ascending order
        #[test]
        fn reversed_range_normalizes(a in 1u32..10_000, b in 1u32..10_000) {
            let span = parse_amount_span(&format!("{a}~{b}만원"));
            prop_assert_eq!(span.kind, AmountKind::Range);
            prop_assert_eq!(span.min, Some(a.min(b) as f64));
            prop_assert_eq!(span.max, Some(a.max(b) as f64));
        }

        /// Invariant: unit conversion scales linearly and preserves sign
        #[test]
        fn unit_conversion_scales(v in 0.0f64..1_000_000.0) {
            prop_assert_eq!(to_manwon(v, Some("만원")), v);
            prop_assert_eq!(to_manwon(v, Some("원")), v / 10_000.0);
            prop_assert_eq!(to_manwon(v, Some("억")), v * 10_000.0);
            prop_assert!(to_manwon(v, Some("천원")) >= 0.0);
        }
    }
}

// ============================================================================
// REGION NOTE TESTS
// ============================================================================

mod note_tests {
    use super::*;
    use marryroute::notes::{normalize_regions, RegionNote};

    proptest! {
        /// Invariant: parsing a composite note never panics
        #[test]
        fn never_panics(s in "\\PC{0,120}") {
            let _ = RegionNote::parse(Some(&s));
        }

        /// Invariant: composite round-trips for clean inputs
        #[test]
        fn composite_roundtrip(
            free in "[가-힣a-z ]{1,20}",
            regions in prop::collection::vec("[가-힣]{1,6}역", 1..4),
        ) {
            let note = RegionNote {
                free_text: Some(free.trim().to_string()).filter(|s| !s.is_empty()),
                regions: normalize_regions(regions),
            };
            let composite = note.to_composite();
            let reparsed = RegionNote::parse(composite.as_deref());
            prop_assert_eq!(note, reparsed);
        }

        /// Invariant: region normalization is idempotent
        #[test]
        fn normalize_idempotent(regions in prop::collection::vec("[가-힣]{1,8}", 0..8)) {
            let once = normalize_regions(regions);
            let twice = normalize_regions(once.clone());
            prop_assert_eq!(once, twice);
        }

        /// Invariant: normalized output has no duplicates and no strict prefixes
        #[test]
        fn normalize_drops_prefixes(regions in prop::collection::vec("[가-힣]{1,8}", 0..8)) {
            let out = normalize_regions(regions);
            for (i, a) in out.iter().enumerate() {
                for (j, b) in out.iter().enumerate() {
                    if i != j {
                        prop_assert!(!b.starts_with(a.as_str()));
                    }
                }
            }
        }

        /// Invariant: replace_regions is replacement, not union
        #[test]
        fn replace_discards_old(old in "[가-힣]{1,6}역", new in "[가-힣]{1,6}동") {
            let mut note = RegionNote {
                free_text: None,
                regions: vec![old.clone()],
            };
            note.replace_regions(&[new.clone()]);
            prop_assert_eq!(note.regions.clone(), vec![new]);
            prop_assert!(!note.regions.contains(&old) || note.regions.len() == 1);
        }
    }
}

// ============================================================================
// CATEGORY TESTS
// ============================================================================

mod category_tests {
    use super::*;
    use marryroute::types::Category;

    proptest! {
        /// Invariant: every category round-trips through its string form
        #[test]
        fn roundtrip(category in prop_oneof![
            Just(Category::Dress),
            Just(Category::Makeup),
            Just(Category::Studio),
            Just(Category::Hall),
        ]) {
            let s = category.as_str();
            let parsed: Category = s.parse().unwrap();
            prop_assert_eq!(category, parsed);
        }

        /// Invariant: unknown category strings fail parsing
        #[test]
        fn unknown_fails(s in "[a-z]{5,20}") {
            if Category::ALL.iter().all(|c| c.as_str() != s) {
                let result: Result<Category, _> = s.parse();
                prop_assert!(result.is_err());
            }
        }
    }
}
