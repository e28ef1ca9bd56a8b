//! Habit, settings and outcome types shared by the engine and its sources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::Day;
use crate::error::ValidationError;

pub type UserId = String;
pub type HabitId = String;
pub type TemplateId = String;

pub const DEFAULT_THRESHOLD_PERCENT: u32 = 70;
pub const DEFAULT_WEEKLY_WIN_TARGET: u32 = 5;
pub const DEFAULT_MONTHLY_WIN_TARGET: u32 = 20;

/// Part of the day a habit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitSection {
    Morning,
    Work,
    Evening,
}

impl HabitSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Work => "Work",
            Self::Evening => "Evening",
        }
    }
}

impl FromStr for HabitSection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Morning" | "morning" => Ok(Self::Morning),
            "Work" | "work" => Ok(Self::Work),
            "Evening" | "evening" => Ok(Self::Evening),
            other => Err(ValidationError::InvalidValue {
                field: "section".into(),
                message: format!("unknown section '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub points: u32,
    pub section: HabitSection,
    pub sort_order: i64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
}

/// Rule used to decide whether a day is a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WinMode {
    /// Done points reach a percentage of the day's total points
    #[default]
    Points,
    /// Every habit in the core set is checked
    Core,
}

impl WinMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Core => "core",
        }
    }
}

impl fmt::Display for WinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WinMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "points" => Ok(Self::Points),
            "core" => Ok(Self::Core),
            other => Err(ValidationError::InvalidValue {
                field: "win_mode".into(),
                message: format!("expected 'points' or 'core', got '{other}'"),
            }),
        }
    }
}

/// Per-user settings as stored. Every field may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub win_mode: Option<WinMode>,
    pub win_threshold_percent: Option<u32>,
    pub weekly_win_target: Option<u32>,
    pub monthly_win_target: Option<u32>,
}

impl UserSettings {
    /// Fill unset fields with engine defaults. Stored values are trusted to
    /// be in range already.
    pub fn resolve(&self) -> ResolvedSettings {
        ResolvedSettings {
            win_mode: self.win_mode.unwrap_or_default(),
            threshold_percent: self
                .win_threshold_percent
                .unwrap_or(DEFAULT_THRESHOLD_PERCENT),
            weekly_target: self.weekly_win_target.unwrap_or(DEFAULT_WEEKLY_WIN_TARGET),
            monthly_target: self
                .monthly_win_target
                .unwrap_or(DEFAULT_MONTHLY_WIN_TARGET),
        }
    }
}

/// Settings with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSettings {
    pub win_mode: WinMode,
    pub threshold_percent: u32,
    pub weekly_target: u32,
    pub monthly_target: u32,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        UserSettings::default().resolve()
    }
}

/// Derived result for one day. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOutcome {
    pub day: Day,
    pub template_id: Option<TemplateId>,
    pub total_points: u64,
    pub done_points: u64,
    pub is_win: bool,
    pub mode_used: WinMode,
    pub used_fallback: bool,
}
