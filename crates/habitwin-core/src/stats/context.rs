//! Inputs for one day's evaluation.
//!
//! [`DaySnapshot`] holds the per-day state read from a source;
//! [`EvaluationContext`] holds the per-user state (settings, core set) that
//! is passed explicitly into every evaluation instead of living anywhere
//! global.

use std::collections::HashSet;

use tracing::warn;

use crate::calendar::Day;
use crate::error::SourceError;
use crate::model::{Habit, HabitId, ResolvedSettings, TemplateId};
use crate::source::HabitSource;

/// Per-user state an evaluation depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationContext {
    pub settings: ResolvedSettings,
    pub core_habits: HashSet<HabitId>,
}

impl EvaluationContext {
    pub fn new(settings: ResolvedSettings, core_habits: HashSet<HabitId>) -> Self {
        Self {
            settings,
            core_habits,
        }
    }

    /// Read settings and the core set fresh from the source.
    pub fn read<S: HabitSource>(source: &S, user: &str) -> Result<Self, SourceError> {
        let settings = source
            .user_settings(user)
            .inspect_err(|e| warn!(user, error = %e, "settings read failed"))?
            .resolve();
        let core_habits = source
            .core_habit_ids(user)
            .inspect_err(|e| warn!(user, error = %e, "core habit read failed"))?;
        Ok(Self::new(settings, core_habits))
    }
}

/// Everything known about one user's day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySnapshot {
    pub day: Day,
    /// Active habits, regardless of the day's template.
    pub active_habits: Vec<Habit>,
    pub template_id: Option<TemplateId>,
    /// Membership of the assigned template, when one is set.
    pub template_habits: Option<HashSet<HabitId>>,
    /// Habit ids checked that day, including inactive or out-of-template ones.
    pub checked: HashSet<HabitId>,
}

impl DaySnapshot {
    pub fn read<S: HabitSource>(source: &S, user: &str, day: Day) -> Result<Self, SourceError> {
        let active_habits = source
            .active_habits(user)
            .inspect_err(|e| warn!(user, %day, error = %e, "habit read failed"))?;
        let template_id = source
            .day_plan_template(user, day)
            .inspect_err(|e| warn!(user, %day, error = %e, "day plan read failed"))?;
        let template_habits = match &template_id {
            Some(t) => Some(
                source
                    .template_habit_ids(t)
                    .inspect_err(|e| warn!(template = %t, error = %e, "template read failed"))?,
            ),
            None => None,
        };
        let checked = source
            .completions(user, day)
            .inspect_err(|e| warn!(user, %day, error = %e, "completion read failed"))?;

        Ok(Self {
            day,
            active_habits,
            template_id,
            template_habits,
            checked,
        })
    }

    /// Habits that count toward the day's points: the template's active
    /// members if a template is assigned, else every active habit.
    pub fn habits_in_scope(&self) -> impl Iterator<Item = &Habit> {
        self.active_habits.iter().filter(move |h| match &self.template_habits {
            Some(members) => members.contains(&h.id),
            None => true,
        })
    }
}
