//! Incremental merge/commit layer.
//!
//! Owns all writes to the persisted profile. Policies are per-field, not
//! global: the global region and per-category amounts are last-write-wins,
//! the per-category region note is a full replace of its region list, and
//! the wedding event merges field by field. One commit is one SQLite
//! transaction; either every field write derived from an input lands, or
//! none do.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::Result;
use crate::parser::Parser;
use crate::storage::{profile, Storage};
use crate::summary::render_summary;
use crate::types::{Category, ParsedFact, ProfileSnapshot, SummaryRow, WeddingEvent};

/// Message surfaced when storage itself fails; the user can simply retry.
pub const STORAGE_RETRY_MESSAGE: &str = "저장 중 문제가 있었습니다. 잠시 후 다시 시도해 주세요.";

/// One pending per-category write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetUpdate {
    pub category: Category,
    pub min_manwon: Option<i64>,
    pub max_manwon: Option<i64>,
    /// `Some` replaces the stored region list for this category.
    pub regions: Option<Vec<String>>,
}

/// Everything one commit would write, derived purely from a parse result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPlan {
    pub region: Option<String>,
    pub budget_updates: Vec<BudgetUpdate>,
    pub event: Option<WeddingEvent>,
    pub reinput: Vec<String>,
}

/// Result of a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub profile: ProfileSnapshot,
    pub summary_id: i64,
    /// Soft-failure messages asking the user to retype a category budget.
    pub reinput: Vec<String>,
}

/// Parse-then-commit result for conversational front-ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub fact: ParsedFact,
    pub outcome: CommitOutcome,
}

/// Reinput-request messages for the parse's soft validation failures.
pub fn reinput_messages(fact: &ParsedFact) -> Vec<String> {
    fact.issues
        .iter()
        .map(|issue| format!("[{}] {}", issue.category.label_korean(), issue.suggestion))
        .collect()
}

/// The commit layer. Serializes commits per user; cross-user commits run in
/// parallel.
pub struct Planner {
    storage: Storage,
    user_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl Planner {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            user_locks: DashMap::new(),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Derive the field writes for one parse result. Pure: performs no I/O,
    /// so it also serves dry-run previews.
    ///
    /// The global-region fallback lives here, not in the parser: a category
    /// mentioned without a bound region inherits the first global region.
    /// Known heuristic limitation: a sentence mixing one global location
    /// with several categories attributes that location to all of them.
    pub fn plan(fact: &ParsedFact) -> CommitPlan {
        let mut category_regions = fact.category_regions.clone();
        if let Some(first_global) = fact.regions.first() {
            for cat in &fact.mentioned_categories {
                category_regions
                    .entry(*cat)
                    .or_insert_with(|| vec![first_global.clone()]);
            }
        }

        let mut budget_updates = Vec::new();
        for budget in &fact.budgets {
            budget_updates.push(BudgetUpdate {
                category: budget.category,
                min_manwon: budget.min_manwon,
                max_manwon: budget.max_manwon,
                regions: category_regions.remove(&budget.category),
            });
        }
        // Categories with a region mention but no amounts get a note-only write.
        for (cat, regions) in category_regions {
            if !regions.is_empty() {
                budget_updates.push(BudgetUpdate {
                    category: cat,
                    min_manwon: None,
                    max_manwon: None,
                    regions: Some(regions),
                });
            }
        }

        CommitPlan {
            region: fact.regions.first().cloned(),
            budget_updates,
            event: fact.event.clone(),
            reinput: reinput_messages(fact),
        }
    }

    /// Apply one parse result to the user's persisted profile.
    ///
    /// All writes plus the summary promotion happen in one transaction.
    /// Floor-violating categories were already dropped by the parser; their
    /// reinput messages ride along in the outcome.
    #[instrument(skip(self, fact), fields(user_id))]
    pub fn commit(&self, user_id: i64, fact: &ParsedFact) -> Result<CommitOutcome> {
        let lock = self
            .user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock();

        let plan = Self::plan(fact);
        let (profile, summary_id) = self.storage.with_transaction(|conn| {
            profile::ensure_user(conn, user_id)?;
            if let Some(region) = &plan.region {
                profile::set_region(conn, user_id, region)?;
            }
            for update in &plan.budget_updates {
                profile::upsert_budget_pref(
                    conn,
                    user_id,
                    update.category,
                    update.min_manwon,
                    update.max_manwon,
                    update.regions.as_deref(),
                )?;
            }
            if let Some(event) = &plan.event {
                profile::merge_wedding_event(conn, user_id, event)?;
            }
            let snapshot = profile::get_snapshot(conn, user_id)?;
            let content = render_summary(&snapshot);
            let summary_id = profile::insert_latest_summary(conn, user_id, &content)?;
            Ok((snapshot, summary_id))
        })?;

        Ok(CommitOutcome {
            profile,
            summary_id,
            reinput: plan.reinput,
        })
    }

    /// Commit variant for chat front-ends: storage faults become a retry
    /// message instead of an error, so the conversation keeps going.
    pub fn commit_lenient(
        &self,
        user_id: i64,
        fact: &ParsedFact,
    ) -> (Option<ProfileSnapshot>, Vec<String>) {
        match self.commit(user_id, fact) {
            Ok(outcome) => (Some(outcome.profile), outcome.reinput),
            Err(err) => {
                warn!(user_id, error = %err, "commit failed");
                let mut messages = reinput_messages(fact);
                messages.push(STORAGE_RETRY_MESSAGE.to_string());
                (None, messages)
            }
        }
    }

    /// Parse `text` and commit the result in one call.
    pub fn update_from_text(
        &self,
        user_id: i64,
        text: &str,
        parser: &Parser,
    ) -> Result<UpdateOutcome> {
        let fact = parser.parse(text);
        let outcome = self.commit(user_id, &fact)?;
        Ok(UpdateOutcome { fact, outcome })
    }

    /// Current persisted state without committing anything.
    pub fn snapshot(&self, user_id: i64) -> Result<ProfileSnapshot> {
        self.storage
            .with_connection(|conn| profile::get_snapshot(conn, user_id))
    }

    pub fn latest_summary(&self, user_id: i64) -> Result<Option<SummaryRow>> {
        self.storage
            .with_connection(|conn| profile::latest_summary(conn, user_id))
    }

    pub fn list_summaries(&self, user_id: i64, limit: i64) -> Result<Vec<SummaryRow>> {
        self.storage
            .with_connection(|conn| profile::list_summaries(conn, user_id, limit))
    }

    /// Promote an older summary snapshot back to latest.
    pub fn promote_summary(&self, user_id: i64, summary_id: i64) -> Result<bool> {
        self.storage
            .with_connection(|conn| profile::promote_summary(conn, user_id, summary_id))
    }
}
