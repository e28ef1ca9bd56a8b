//! SQLite-backed habit storage.
//!
//! Provides the read side the engine consumes ([`HabitSource`]) plus the
//! handful of writes needed to seed a database from the CLI or from tests.
//! Writes perform no business validation (ownership, uniqueness); that
//! belongs to whatever application owns the data.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::calendar::Day;
use crate::error::{Result, SourceError};
use crate::model::{Habit, HabitId, HabitSection, Template, TemplateId, UserSettings, WinMode};
use crate::source::HabitSource;

use super::{data_dir, migrations};

/// SQLite database holding habits, templates, day plans, checks and settings.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitwin/habitwin.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitwin.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| SourceError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        migrations::migrate(&self.conn)
    }

    /// Insert or replace a habit.
    pub fn insert_habit(&self, user: &str, habit: &Habit) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO habits (id, user_id, name, points, section, sort_order, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                habit.id,
                user,
                habit.name,
                habit.points,
                habit.section.as_str(),
                habit.sort_order,
                habit.active,
            ],
        )?;
        Ok(())
    }

    pub fn set_habit_active(&self, habit_id: &str, active: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE habits SET active = ?1 WHERE id = ?2",
            params![active, habit_id],
        )?;
        Ok(())
    }

    pub fn insert_template(&self, user: &str, template: &Template) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO templates (id, user_id, name) VALUES (?1, ?2, ?3)",
            params![template.id, user, template.name],
        )?;
        Ok(())
    }

    /// Replace a template's habit membership.
    pub fn set_template_habits(&self, template_id: &str, habit_ids: &[&str]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM template_habits WHERE template_id = ?1",
            params![template_id],
        )?;
        for habit_id in habit_ids {
            tx.execute(
                "INSERT OR IGNORE INTO template_habits (template_id, habit_id) VALUES (?1, ?2)",
                params![template_id, habit_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Assign a template to a day, or clear the plan with `None`.
    pub fn set_day_plan(&self, user: &str, day: Day, template_id: Option<&str>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO day_plans (user_id, day, template_id) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, day) DO UPDATE SET template_id = excluded.template_id",
            params![user, day.to_string(), template_id],
        )?;
        Ok(())
    }

    pub fn set_check(&self, user: &str, day: Day, habit_id: &str, checked: bool) -> Result<()> {
        self.conn.execute(
            "INSERT INTO habit_checks (user_id, day, habit_id, checked) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, day, habit_id) DO UPDATE SET checked = excluded.checked",
            params![user, day.to_string(), habit_id, checked],
        )?;
        Ok(())
    }

    /// Replace the user's core habit set. An empty slice unconfigures it.
    pub fn set_core_habits(&self, user: &str, habit_ids: &[&str]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM user_core_habits WHERE user_id = ?1", params![user])?;
        for habit_id in habit_ids {
            tx.execute(
                "INSERT OR IGNORE INTO user_core_habits (user_id, habit_id) VALUES (?1, ?2)",
                params![user, habit_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn save_settings(&self, user: &str, settings: &UserSettings) -> Result<()> {
        self.conn.execute(
            "INSERT INTO user_settings
                (user_id, win_mode, win_threshold_percent, weekly_win_target, monthly_win_target)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                win_mode = excluded.win_mode,
                win_threshold_percent = excluded.win_threshold_percent,
                weekly_win_target = excluded.weekly_win_target,
                monthly_win_target = excluded.monthly_win_target",
            params![
                user,
                settings.win_mode.map(|m| m.as_str()),
                settings.win_threshold_percent,
                settings.weekly_win_target,
                settings.monthly_win_target,
            ],
        )?;
        Ok(())
    }

    fn id_set(&self, sql: &str, params: impl rusqlite::Params) -> Result<HashSet<HabitId>, SourceError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }
}

/// Stored zero or negative numbers read as unset.
fn positive(value: Option<i64>) -> Option<u32> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

impl HabitSource for Database {
    fn active_habits(&self, user: &str) -> Result<Vec<Habit>, SourceError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, points, section, sort_order, active
             FROM habits
             WHERE user_id = ?1 AND active = 1
             ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map(params![user], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, bool>(5)?,
            ))
        })?;

        let mut habits = Vec::new();
        for row in rows {
            let (id, name, points, section, sort_order, active) = row?;
            let section: HabitSection = section
                .parse()
                .map_err(|e| SourceError::Database(format!("habit {id}: {e}")))?;
            habits.push(Habit {
                id,
                name,
                points,
                section,
                sort_order,
                active,
            });
        }
        Ok(habits)
    }

    fn day_plan_template(&self, user: &str, day: Day) -> Result<Option<TemplateId>, SourceError> {
        let template = self
            .conn
            .query_row(
                "SELECT template_id FROM day_plans WHERE user_id = ?1 AND day = ?2",
                params![user, day.to_string()],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(template.flatten())
    }

    fn template_habit_ids(&self, template: &str) -> Result<HashSet<HabitId>, SourceError> {
        self.id_set(
            "SELECT habit_id FROM template_habits WHERE template_id = ?1",
            params![template],
        )
    }

    fn completions(&self, user: &str, day: Day) -> Result<HashSet<HabitId>, SourceError> {
        self.id_set(
            "SELECT habit_id FROM habit_checks WHERE user_id = ?1 AND day = ?2 AND checked = 1",
            params![user, day.to_string()],
        )
    }

    fn core_habit_ids(&self, user: &str) -> Result<HashSet<HabitId>, SourceError> {
        self.id_set(
            "SELECT habit_id FROM user_core_habits WHERE user_id = ?1",
            params![user],
        )
    }

    fn user_settings(&self, user: &str) -> Result<UserSettings, SourceError> {
        let row = self
            .conn
            .query_row(
                "SELECT win_mode, win_threshold_percent, weekly_win_target, monthly_win_target
                 FROM user_settings WHERE user_id = ?1",
                params![user],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((mode, threshold, weekly, monthly)) = row else {
            return Ok(UserSettings::default());
        };

        let win_mode = match mode.as_deref() {
            None | Some("") => None,
            Some(raw) => match raw.parse::<WinMode>() {
                Ok(m) => Some(m),
                Err(_) => {
                    warn!(user, win_mode = raw, "unknown win mode, using default");
                    None
                }
            },
        };

        Ok(UserSettings {
            win_mode,
            win_threshold_percent: positive(threshold),
            weekly_win_target: positive(weekly),
            monthly_win_target: positive(monthly),
        })
    }
}
