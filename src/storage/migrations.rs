//! Database migrations.

use rusqlite::Connection;

use crate::error::Result;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Initial schema (v1)
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Whole-profile facts: one row per user
        CREATE TABLE IF NOT EXISTS user_profile (
            user_id INTEGER PRIMARY KEY,
            name TEXT,
            region TEXT,
            contact TEXT,
            notes TEXT
        );

        -- Per-category budget preferences, amounts in manwon
        CREATE TABLE IF NOT EXISTS budget_pref (
            budget_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            min_manwon INTEGER,
            max_manwon INTEGER,
            locked INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            UNIQUE(user_id, category),
            FOREIGN KEY (user_id) REFERENCES user_profile(user_id) ON DELETE CASCADE
        );

        -- Events; collapsed to one live row per (user, type)
        CREATE TABLE IF NOT EXISTS event (
            event_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            type TEXT NOT NULL,
            title TEXT,
            date TEXT,
            time TEXT,
            location TEXT,
            budget_manwon INTEGER,
            memo TEXT,
            FOREIGN KEY (user_id) REFERENCES user_profile(user_id) ON DELETE CASCADE
        );

        -- Append-only summary history; exactly one latest=1 row per user
        CREATE TABLE IF NOT EXISTS conversation_summary (
            summary_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            latest INTEGER NOT NULL DEFAULT 0,
            content TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES user_profile(user_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_pref_user ON budget_pref(user_id);
        CREATE INDEX IF NOT EXISTS idx_event_user_type ON event(user_id, type);
        CREATE INDEX IF NOT EXISTS idx_summary_user_latest ON conversation_summary(user_id, latest);
        "#,
    )?;

    conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
