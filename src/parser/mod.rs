//! Rule-based extraction engine for Korean wedding-planning utterances.
//!
//! Pure and synchronous: `parse` has no side effects and is deterministic
//! for a given text and reference date, so it is safe to call concurrently.

pub mod amount;
pub mod budget;
pub mod date;
pub mod event;
pub mod lexicon;
pub mod region;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::ParsedFact;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// The extraction engine. Holds only the injected reference date used for
/// year inference.
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    reference_date: NaiveDate,
}

impl Parser {
    /// Parser with an explicit reference date ("today" for year inference).
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    /// Parser anchored to local wall-clock today. Tests should prefer
    /// [`Parser::new`] with a fixed date.
    pub fn for_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Extract all structured facts from one utterance.
    pub fn parse(&self, text: &str) -> ParsedFact {
        let text = WHITESPACE_RE.replace_all(text.trim(), " ").into_owned();
        if text.is_empty() {
            return ParsedFact::default();
        }

        let dates = date::extract_dates(&text, self.reference_date);
        let (regions, category_regions) = region::extract_regions(&text);
        let (budgets, issues) = budget::extract_budgets(&text);
        let event = event::detect_wedding_event(&text, &dates);
        let mentioned_categories = lexicon::mentioned_categories(&text);

        debug!(
            dates = dates.len(),
            regions = regions.len(),
            budgets = budgets.len(),
            issues = issues.len(),
            event = event.is_some(),
            "parse complete"
        );

        ParsedFact {
            dates,
            regions,
            category_regions,
            budgets,
            event,
            issues,
            mentioned_categories,
        }
    }
}
