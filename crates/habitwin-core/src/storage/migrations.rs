//! Database schema migrations for habitwin.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{debug, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);
    debug!(current_version, latest = SCHEMA_VERSION, "checking schema");

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(tx: &Connection, version: i32) -> SqliteResult<()> {
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: habits, templates, day plans and checks.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            name        TEXT NOT NULL,
            points      INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
            section     TEXT NOT NULL DEFAULT 'Morning',
            sort_order  INTEGER NOT NULL DEFAULT 0,
            active      INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS templates (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            name        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS template_habits (
            template_id TEXT NOT NULL,
            habit_id    TEXT NOT NULL,
            PRIMARY KEY (template_id, habit_id)
        );

        CREATE TABLE IF NOT EXISTS day_plans (
            user_id     TEXT NOT NULL,
            day         TEXT NOT NULL,
            template_id TEXT,
            PRIMARY KEY (user_id, day)
        );

        CREATE TABLE IF NOT EXISTS habit_checks (
            user_id     TEXT NOT NULL,
            day         TEXT NOT NULL,
            habit_id    TEXT NOT NULL,
            checked     INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, day, habit_id)
        );

        CREATE INDEX IF NOT EXISTS idx_habits_user_active ON habits(user_id, active);
        CREATE INDEX IF NOT EXISTS idx_habit_checks_user_day ON habit_checks(user_id, day);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

/// Migration v2: per-user win settings and core habit set.
///
/// Settings columns are nullable; the engine fills defaults on read.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id               TEXT PRIMARY KEY,
            win_mode              TEXT,
            win_threshold_percent INTEGER,
            weekly_win_target     INTEGER,
            monthly_win_target    INTEGER
        );

        CREATE TABLE IF NOT EXISTS user_core_habits (
            user_id     TEXT NOT NULL,
            habit_id    TEXT NOT NULL,
            PRIMARY KEY (user_id, habit_id)
        );",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}
