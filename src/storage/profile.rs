//! Queries over the persisted wedding-plan profile.
//!
//! Reads of prior state are lenient: a malformed stored row degrades to
//! defaults instead of failing the commit, so the conversation stays usable.

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use crate::error::Result;
use crate::notes::RegionNote;
use crate::types::{BudgetPref, Category, ProfileSnapshot, SummaryRow, WeddingEvent};

fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Create the profile row on first contact (empty defaults).
pub fn ensure_user(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO user_profile(user_id, name, region, contact, notes)
         VALUES (?, NULL, NULL, NULL, NULL)",
        params![user_id],
    )?;
    Ok(())
}

/// Replace the whole-profile default region (last-write-wins).
pub fn set_region(conn: &Connection, user_id: i64, region: &str) -> Result<()> {
    conn.execute(
        "UPDATE user_profile SET region = ? WHERE user_id = ?",
        params![region, user_id],
    )?;
    Ok(())
}

pub fn get_region(conn: &Connection, user_id: i64) -> Result<Option<String>> {
    let region = conn
        .query_row(
            "SELECT region FROM user_profile WHERE user_id = ?",
            params![user_id],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?
        .flatten();
    Ok(region)
}

fn budget_pref_from_row(row: &Row) -> rusqlite::Result<Option<BudgetPref>> {
    let category_str: String = row.get("category")?;
    let Ok(category) = category_str.parse::<Category>() else {
        warn!(category = %category_str, "skipping budget row with unknown category");
        return Ok(None);
    };
    Ok(Some(BudgetPref {
        category,
        min_manwon: row.get("min_manwon").unwrap_or(None),
        max_manwon: row.get("max_manwon").unwrap_or(None),
        locked: row.get::<_, i64>("locked").unwrap_or(0) != 0,
        notes: row.get("notes").unwrap_or(None),
    }))
}

pub fn get_budget_pref(
    conn: &Connection,
    user_id: i64,
    category: Category,
) -> Result<Option<BudgetPref>> {
    let pref = conn
        .query_row(
            "SELECT category, min_manwon, max_manwon, locked, notes
             FROM budget_pref WHERE user_id = ? AND category = ?",
            params![user_id, category.as_str()],
            budget_pref_from_row,
        )
        .optional()?
        .flatten();
    Ok(pref)
}

/// All budget preferences for a user, ordered by category name.
pub fn list_budget_prefs(conn: &Connection, user_id: i64) -> Result<Vec<BudgetPref>> {
    let mut stmt = conn.prepare(
        "SELECT category, min_manwon, max_manwon, locked, notes
         FROM budget_pref WHERE user_id = ? ORDER BY category",
    )?;
    let rows = stmt.query_map(params![user_id], budget_pref_from_row)?;
    let mut prefs = Vec::new();
    for row in rows {
        if let Some(pref) = row? {
            prefs.push(pref);
        }
    }
    Ok(prefs)
}

/// Upsert one category's budget preference.
///
/// Amounts follow last-write-wins per category; `new_regions`, when present,
/// REPLACES the region list of the composite note. Free text already stored
/// in the note is preserved untouched. Fields passed as `None` keep their
/// stored values.
pub fn upsert_budget_pref(
    conn: &Connection,
    user_id: i64,
    category: Category,
    min_manwon: Option<i64>,
    max_manwon: Option<i64>,
    new_regions: Option<&[String]>,
) -> Result<()> {
    let existing = conn
        .query_row(
            "SELECT budget_id, notes FROM budget_pref WHERE user_id = ? AND category = ?",
            params![user_id, category.as_str()],
            |row| {
                Ok((
                    row.get::<_, i64>("budget_id")?,
                    row.get::<_, Option<String>>("notes").unwrap_or(None),
                ))
            },
        )
        .optional()?;

    match existing {
        Some((budget_id, prior_notes)) => {
            if let Some(min) = min_manwon {
                conn.execute(
                    "UPDATE budget_pref SET min_manwon = ? WHERE budget_id = ?",
                    params![min, budget_id],
                )?;
            }
            if let Some(max) = max_manwon {
                conn.execute(
                    "UPDATE budget_pref SET max_manwon = ? WHERE budget_id = ?",
                    params![max, budget_id],
                )?;
            }
            if let Some(regions) = new_regions {
                let mut note = RegionNote::parse(prior_notes.as_deref());
                note.replace_regions(regions);
                conn.execute(
                    "UPDATE budget_pref SET notes = ? WHERE budget_id = ?",
                    params![note.to_composite(), budget_id],
                )?;
            }
        }
        None => {
            let notes = new_regions.and_then(|regions| {
                let mut note = RegionNote::default();
                note.replace_regions(regions);
                note.to_composite()
            });
            conn.execute(
                "INSERT INTO budget_pref(user_id, category, min_manwon, max_manwon, locked, notes)
                 VALUES (?, ?, ?, ?, 0, ?)",
                params![user_id, category.as_str(), min_manwon, max_manwon, notes],
            )?;
        }
    }
    Ok(())
}

fn event_from_row(row: &Row) -> rusqlite::Result<(i64, WeddingEvent)> {
    Ok((
        row.get("event_id")?,
        WeddingEvent {
            date: row.get("date").unwrap_or(None),
            time: row.get("time").unwrap_or(None),
            location: row.get("location").unwrap_or(None),
            budget_manwon: row.get("budget_manwon").unwrap_or(None),
        },
    ))
}

/// Merge the ceremony event into storage.
///
/// Pre-existing rows of the same type are first collapsed into one
/// (first-non-null per field across rows, oldest row id survives), then the
/// new parse's non-null fields overwrite the collapsed values. Leftover
/// duplicate rows are deleted.
pub fn merge_wedding_event(conn: &Connection, user_id: i64, new: &WeddingEvent) -> Result<i64> {
    let mut stmt = conn.prepare(
        "SELECT event_id, date, time, location, budget_manwon
         FROM event WHERE user_id = ? AND type = 'wedding' ORDER BY event_id ASC",
    )?;
    let rows: Vec<(i64, WeddingEvent)> = stmt
        .query_map(params![user_id], event_from_row)?
        .collect::<rusqlite::Result<_>>()?;

    let keep_id = rows.first().map(|(id, _)| *id);
    let mut merged = WeddingEvent::default();
    for (_, ev) in &rows {
        merged.date = merged.date.or_else(|| ev.date.clone());
        merged.time = merged.time.or_else(|| ev.time.clone());
        merged.location = merged.location.or_else(|| ev.location.clone());
        merged.budget_manwon = merged.budget_manwon.or(ev.budget_manwon);
    }

    // New input overwrites field by field; absent fields keep stored values.
    if new.date.is_some() {
        merged.date = new.date.clone();
    }
    if new.time.is_some() {
        merged.time = new.time.clone();
    }
    if new.location.is_some() {
        merged.location = new.location.clone();
    }
    if new.budget_manwon.is_some() {
        merged.budget_manwon = new.budget_manwon;
    }

    let keep_id = match keep_id {
        Some(id) => {
            conn.execute(
                "UPDATE event SET date = ?, time = ?, location = ?, budget_manwon = ?
                 WHERE event_id = ?",
                params![merged.date, merged.time, merged.location, merged.budget_manwon, id],
            )?;
            id
        }
        None => {
            conn.execute(
                "INSERT INTO event(user_id, type, title, date, time, location, budget_manwon, memo)
                 VALUES (?, 'wedding', NULL, ?, ?, ?, ?, NULL)",
                params![user_id, merged.date, merged.time, merged.location, merged.budget_manwon],
            )?;
            conn.last_insert_rowid()
        }
    };

    conn.execute(
        "DELETE FROM event WHERE user_id = ? AND type = 'wedding' AND event_id <> ?",
        params![user_id, keep_id],
    )?;
    Ok(keep_id)
}

pub fn get_wedding_event(conn: &Connection, user_id: i64) -> Result<Option<WeddingEvent>> {
    let event = conn
        .query_row(
            "SELECT event_id, date, time, location, budget_manwon
             FROM event WHERE user_id = ? AND type = 'wedding' ORDER BY event_id ASC LIMIT 1",
            params![user_id],
            event_from_row,
        )
        .optional()?
        .map(|(_, ev)| ev);
    Ok(event)
}

/// Full read-back of a user's persisted plan.
pub fn get_snapshot(conn: &Connection, user_id: i64) -> Result<ProfileSnapshot> {
    Ok(ProfileSnapshot {
        user_id,
        region: get_region(conn, user_id)?,
        budgets: list_budget_prefs(conn, user_id)?,
        wedding: get_wedding_event(conn, user_id)?,
    })
}

/// Demote the previous latest summary and insert `content` as the new
/// latest. Callers run this inside the commit transaction so the flip is
/// atomic (never zero or two latest rows).
pub fn insert_latest_summary(conn: &Connection, user_id: i64, content: &str) -> Result<i64> {
    conn.execute(
        "UPDATE conversation_summary SET latest = 0 WHERE user_id = ? AND latest = 1",
        params![user_id],
    )?;
    conn.execute(
        "INSERT INTO conversation_summary(user_id, latest, content, updated_at)
         VALUES (?, 1, ?, ?)",
        params![user_id, content, now_iso()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn summary_from_row(row: &Row) -> rusqlite::Result<SummaryRow> {
    Ok(SummaryRow {
        summary_id: row.get("summary_id")?,
        latest: row.get::<_, i64>("latest")? != 0,
        content: row.get("content")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn latest_summary(conn: &Connection, user_id: i64) -> Result<Option<SummaryRow>> {
    let row = conn
        .query_row(
            "SELECT summary_id, latest, content, updated_at
             FROM conversation_summary
             WHERE user_id = ? AND latest = 1
             ORDER BY summary_id DESC LIMIT 1",
            params![user_id],
            summary_from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn list_summaries(conn: &Connection, user_id: i64, limit: i64) -> Result<Vec<SummaryRow>> {
    let mut stmt = conn.prepare(
        "SELECT summary_id, latest, content, updated_at
         FROM conversation_summary
         WHERE user_id = ? ORDER BY summary_id DESC LIMIT ?",
    )?;
    let rows = stmt.query_map(params![user_id, limit], summary_from_row)?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

/// Re-flag an older summary as the latest one. Returns false when the id
/// does not belong to this user.
pub fn promote_summary(conn: &Connection, user_id: i64, summary_id: i64) -> Result<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM conversation_summary WHERE summary_id = ? AND user_id = ?",
            params![summary_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Ok(false);
    }
    conn.execute(
        "UPDATE conversation_summary SET latest = 0 WHERE user_id = ?",
        params![user_id],
    )?;
    conn.execute(
        "UPDATE conversation_summary SET latest = 1 WHERE summary_id = ? AND user_id = ?",
        params![summary_id, user_id],
    )?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn setup() -> Storage {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .with_connection(|conn| ensure_user(conn, 1))
            .unwrap();
        storage
    }

    #[test]
    fn region_is_last_write_wins() {
        let storage = setup();
        storage
            .with_connection(|conn| {
                set_region(conn, 1, "강남구")?;
                set_region(conn, 1, "마포구")?;
                assert_eq!(get_region(conn, 1)?.as_deref(), Some("마포구"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn budget_upsert_keeps_unmentioned_fields() {
        let storage = setup();
        storage
            .with_connection(|conn| {
                upsert_budget_pref(conn, 1, Category::Dress, Some(300), Some(400), None)?;
                upsert_budget_pref(conn, 1, Category::Dress, None, Some(450), None)?;
                let pref = get_budget_pref(conn, 1, Category::Dress)?.unwrap();
                assert_eq!(pref.min_manwon, Some(300));
                assert_eq!(pref.max_manwon, Some(450));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn region_note_is_replaced_not_unioned() {
        let storage = setup();
        storage
            .with_connection(|conn| {
                upsert_budget_pref(
                    conn,
                    1,
                    Category::Studio,
                    None,
                    None,
                    Some(&["홍대입구역".to_string()]),
                )?;
                upsert_budget_pref(
                    conn,
                    1,
                    Category::Studio,
                    None,
                    None,
                    Some(&["청담역".to_string()]),
                )?;
                let pref = get_budget_pref(conn, 1, Category::Studio)?.unwrap();
                assert_eq!(pref.notes.as_deref(), Some("지역:청담역"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn free_note_text_survives_region_replace() {
        let storage = setup();
        storage
            .with_connection(|conn| {
                upsert_budget_pref(conn, 1, Category::Hall, Some(800), None, None)?;
                conn.execute(
                    "UPDATE budget_pref SET notes = '상담 예약함 | 지역:잠실동'
                     WHERE user_id = 1 AND category = 'hall'",
                    [],
                )?;
                upsert_budget_pref(conn, 1, Category::Hall, None, None, Some(&["교대역".to_string()]))?;
                let pref = get_budget_pref(conn, 1, Category::Hall)?.unwrap();
                assert_eq!(pref.notes.as_deref(), Some("상담 예약함 | 지역:교대역"));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn event_rows_collapse_to_oldest_id() {
        let storage = setup();
        storage
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO event(user_id, type, date) VALUES (1, 'wedding', '2025-10-26')",
                    [],
                )?;
                conn.execute(
                    "INSERT INTO event(user_id, type, location) VALUES (1, 'wedding', '교대')",
                    [],
                )?;
                let keep_id = merge_wedding_event(
                    conn,
                    1,
                    &WeddingEvent {
                        time: Some("14:00".to_string()),
                        ..Default::default()
                    },
                )?;
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM event WHERE user_id = 1 AND type = 'wedding'",
                    [],
                    |row| row.get(0),
                )?;
                assert_eq!(count, 1);
                let ev = get_wedding_event(conn, 1)?.unwrap();
                assert_eq!(ev.date.as_deref(), Some("2025-10-26"));
                assert_eq!(ev.location.as_deref(), Some("교대"));
                assert_eq!(ev.time.as_deref(), Some("14:00"));
                // Oldest row id survives.
                let min_id: i64 = conn.query_row(
                    "SELECT MIN(event_id) FROM event WHERE user_id = 1",
                    [],
                    |row| row.get(0),
                )?;
                assert_eq!(keep_id, min_id);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn summary_latest_flag_is_singleton() {
        let storage = setup();
        storage
            .with_connection(|conn| {
                insert_latest_summary(conn, 1, "첫번째")?;
                let second = insert_latest_summary(conn, 1, "두번째")?;
                let latest_count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM conversation_summary WHERE user_id = 1 AND latest = 1",
                    [],
                    |row| row.get(0),
                )?;
                assert_eq!(latest_count, 1);
                assert_eq!(latest_summary(conn, 1)?.unwrap().summary_id, second);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn promote_reflags_an_older_summary() {
        let storage = setup();
        storage
            .with_connection(|conn| {
                let first = insert_latest_summary(conn, 1, "첫번째")?;
                insert_latest_summary(conn, 1, "두번째")?;
                assert!(promote_summary(conn, 1, first)?);
                assert_eq!(latest_summary(conn, 1)?.unwrap().summary_id, first);
                assert!(!promote_summary(conn, 1, 9999)?);
                Ok(())
            })
            .unwrap();
    }
}
