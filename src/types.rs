//! Core data types shared by the parser and the commit layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Trailing window scanned for an amount after a category keyword, in chars.
pub const AMOUNT_WINDOW_CHARS: usize = 40;

/// Lookbehind window deciding whether a region token is category-bound, in chars.
pub const REGION_BIND_WINDOW_CHARS: usize = 8;

/// Lookbehind window used to pick which category a bound region belongs to, in chars.
pub const REGION_CATEGORY_WINDOW_CHARS: usize = 12;

/// Context window around a bare M/D match that must contain a date clue, in chars.
pub const DATE_CONTEXT_WINDOW_CHARS: usize = 15;

/// A bare M/D match this close after a category keyword is price-like, not a date.
pub const DATE_CATEGORY_GUARD_CHARS: usize = 8;

/// The four wedding-vendor service types budgets and regions are tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Dress,
    Makeup,
    Studio,
    Hall,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Dress,
        Category::Makeup,
        Category::Studio,
        Category::Hall,
    ];

    /// Canonical storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dress => "dress",
            Category::Makeup => "makeup",
            Category::Studio => "studio",
            Category::Hall => "hall",
        }
    }

    /// Korean display name used in user-facing messages.
    pub fn label_korean(&self) -> &'static str {
        match self {
            Category::Dress => "드레스",
            Category::Makeup => "메이크업",
            Category::Studio => "스튜디오",
            Category::Hall => "예식장",
        }
    }

    /// Surface synonyms recognized in input text.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Category::Dress => &["드레스", "본식드레스", "촬영드레스"],
            Category::Makeup => &["메이크업", "메컵", "헤어", "헤메"],
            Category::Studio => &[
                "스튜디오",
                "촬영",
                "리허설",
                "스냅",
                "스냅촬영",
                "리허설촬영",
                "본식스냅",
            ],
            Category::Hall => &["예식장", "결혼식장", "웨딩홀", "홀", "예식홀"],
        }
    }

    /// Minimum acceptable budget in manwon. Parses below this are rejected
    /// with a reinput request instead of being silently clamped.
    pub fn min_floor_manwon(&self) -> i64 {
        match self {
            Category::Hall => 100,
            Category::Studio => 30,
            Category::Dress => 50,
            Category::Makeup => 10,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dress" => Ok(Category::Dress),
            "makeup" => Ok(Category::Makeup),
            "studio" => Ok(Category::Studio),
            "hall" => Ok(Category::Hall),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Which amount pattern matched inside a budget window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    PlusMinus,
    Range,
    Le,
    Ge,
    Single,
    None,
}

/// One parsed budget range for a category, amounts in manwon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSpan {
    pub category: Category,
    pub min_manwon: Option<i64>,
    pub max_manwon: Option<i64>,
    /// The synonym that anchored the window.
    pub matched_keyword: String,
    pub kind: AmountKind,
}

/// Soft validation failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    MinTooLow,
}

/// A user-correctable problem found while parsing. Never an error type:
/// issues are data so callers and tests can assert on them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub code: IssueCode,
    pub category: Category,
    pub min_required: i64,
    pub observed: i64,
    /// The window text the offending amount was read from.
    pub context: String,
    pub suggestion: String,
}

/// The single wedding-ceremony event record. All fields independently
/// nullable and independently updatable by the merge layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeddingEvent {
    /// ISO date (YYYY-MM-DD) when a date was extracted.
    pub date: Option<String>,
    /// HH:MM, 24h.
    pub time: Option<String>,
    pub location: Option<String>,
    pub budget_manwon: Option<i64>,
}

impl WeddingEvent {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time.is_none()
            && self.location.is_none()
            && self.budget_manwon.is_none()
    }
}

/// Everything extracted from one utterance. Produced fresh per input by the
/// parser, consumed by the commit layer, then discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFact {
    /// ISO dates, deduplicated, discovery order.
    pub dates: Vec<String>,
    /// Location tokens not bound to any category, deduplicated.
    pub regions: Vec<String>,
    /// Location tokens bound to a nearby category keyword.
    pub category_regions: BTreeMap<Category, Vec<String>>,
    /// At most one entry per category (last mention in text wins).
    pub budgets: Vec<BudgetSpan>,
    /// At most one ceremony event.
    pub event: Option<WeddingEvent>,
    pub issues: Vec<ParseIssue>,
    /// Categories whose keywords appear anywhere in the text, discovery
    /// order. Lets the commit layer apply the global-region fallback.
    pub mentioned_categories: Vec<Category>,
}

/// One stored per-category budget preference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPref {
    pub category: Category,
    pub min_manwon: Option<i64>,
    pub max_manwon: Option<i64>,
    pub locked: bool,
    /// Composite note; its `지역:...` segment is machine-managed.
    pub notes: Option<String>,
}

/// Point-in-time view of a user's persisted plan, as read back after a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub user_id: i64,
    pub region: Option<String>,
    pub budgets: Vec<BudgetPref>,
    pub wedding: Option<WeddingEvent>,
}

/// One row of the append-only summary history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub summary_id: i64,
    pub latest: bool,
    pub content: String,
    pub updated_at: String,
}
