//! Read-side collaborator contract for the engine.
//!
//! The engine never writes. It asks a [`HabitSource`] for fresh snapshots
//! on every evaluation, so whatever backs the source (SQLite, memory, a
//! remote API) owns persistence and consistency.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::calendar::Day;
use crate::error::SourceError;
use crate::model::{Habit, HabitId, TemplateId, UserSettings};

/// Read accessors the engine consumes. Every call may fail with a
/// [`SourceError`], which the engine propagates unchanged.
pub trait HabitSource {
    /// Active (non-deleted) habits for the user.
    fn active_habits(&self, user: &str) -> Result<Vec<Habit>, SourceError>;

    /// Template assigned to the user's day, if any.
    fn day_plan_template(&self, user: &str, day: Day) -> Result<Option<TemplateId>, SourceError>;

    /// Habit ids that belong to a template.
    fn template_habit_ids(&self, template: &str) -> Result<HashSet<HabitId>, SourceError>;

    /// Habit ids checked by the user on the day.
    fn completions(&self, user: &str, day: Day) -> Result<HashSet<HabitId>, SourceError>;

    /// The user's core habit set. Empty when unconfigured.
    fn core_habit_ids(&self, user: &str) -> Result<HashSet<HabitId>, SourceError>;

    /// Stored settings. Missing rows read as all-unset.
    fn user_settings(&self, user: &str) -> Result<UserSettings, SourceError>;
}

impl<S: HabitSource + ?Sized> HabitSource for &S {
    fn active_habits(&self, user: &str) -> Result<Vec<Habit>, SourceError> {
        (**self).active_habits(user)
    }

    fn day_plan_template(&self, user: &str, day: Day) -> Result<Option<TemplateId>, SourceError> {
        (**self).day_plan_template(user, day)
    }

    fn template_habit_ids(&self, template: &str) -> Result<HashSet<HabitId>, SourceError> {
        (**self).template_habit_ids(template)
    }

    fn completions(&self, user: &str, day: Day) -> Result<HashSet<HabitId>, SourceError> {
        (**self).completions(user, day)
    }

    fn core_habit_ids(&self, user: &str) -> Result<HashSet<HabitId>, SourceError> {
        (**self).core_habit_ids(user)
    }

    fn user_settings(&self, user: &str) -> Result<UserSettings, SourceError> {
        (**self).user_settings(user)
    }
}

/// In-memory source for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    habits: HashMap<String, Vec<Habit>>,
    templates: HashMap<TemplateId, HashSet<HabitId>>,
    plans: HashMap<(String, Day), TemplateId>,
    checks: HashMap<(String, Day), HashSet<HabitId>>,
    core: HashMap<String, HashSet<HabitId>>,
    settings: HashMap<String, UserSettings>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a habit. Inactive habits are stored but not returned
    /// by [`HabitSource::active_habits`].
    pub fn put_habit(&mut self, user: &str, habit: Habit) {
        let list = self.habits.entry(user.to_string()).or_default();
        list.retain(|h| h.id != habit.id);
        list.push(habit);
    }

    pub fn put_template<I, H>(&mut self, template: &str, habit_ids: I)
    where
        I: IntoIterator<Item = H>,
        H: Into<HabitId>,
    {
        self.templates.insert(
            template.to_string(),
            habit_ids.into_iter().map(Into::into).collect(),
        );
    }

    pub fn set_day_plan(&mut self, user: &str, day: Day, template: Option<&str>) {
        let key = (user.to_string(), day);
        match template {
            Some(t) => {
                self.plans.insert(key, t.to_string());
            }
            None => {
                self.plans.remove(&key);
            }
        }
    }

    pub fn set_check(&mut self, user: &str, day: Day, habit: &str, checked: bool) {
        let set = self.checks.entry((user.to_string(), day)).or_default();
        if checked {
            set.insert(habit.to_string());
        } else {
            set.remove(habit);
        }
    }

    pub fn set_core_habits<I, H>(&mut self, user: &str, habit_ids: I)
    where
        I: IntoIterator<Item = H>,
        H: Into<HabitId>,
    {
        self.core.insert(
            user.to_string(),
            habit_ids.into_iter().map(Into::into).collect(),
        );
    }

    pub fn set_settings(&mut self, user: &str, settings: UserSettings) {
        self.settings.insert(user.to_string(), settings);
    }
}

impl HabitSource for MemorySource {
    fn active_habits(&self, user: &str) -> Result<Vec<Habit>, SourceError> {
        let mut habits: Vec<Habit> = self
            .habits
            .get(user)
            .map(|list| list.iter().filter(|h| h.active).cloned().collect())
            .unwrap_or_default();
        habits.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        Ok(habits)
    }

    fn day_plan_template(&self, user: &str, day: Day) -> Result<Option<TemplateId>, SourceError> {
        Ok(self.plans.get(&(user.to_string(), day)).cloned())
    }

    fn template_habit_ids(&self, template: &str) -> Result<HashSet<HabitId>, SourceError> {
        Ok(self.templates.get(template).cloned().unwrap_or_default())
    }

    fn completions(&self, user: &str, day: Day) -> Result<HashSet<HabitId>, SourceError> {
        Ok(self
            .checks
            .get(&(user.to_string(), day))
            .cloned()
            .unwrap_or_default())
    }

    fn core_habit_ids(&self, user: &str) -> Result<HashSet<HabitId>, SourceError> {
        Ok(self.core.get(user).cloned().unwrap_or_default())
    }

    fn user_settings(&self, user: &str) -> Result<UserSettings, SourceError> {
        Ok(self.settings.get(user).cloned().unwrap_or_default())
    }
}

/// Memoizes reads for the lifetime of one query.
///
/// Per-user reads are keyed by user, per-day reads by `(user, day)`.
/// Create one per query and drop it afterwards; a long-lived instance would
/// hide edits made after the first read.
pub struct CachingSource<S> {
    inner: S,
    habits: RefCell<HashMap<String, Vec<Habit>>>,
    plans: RefCell<HashMap<(String, Day), Option<TemplateId>>>,
    templates: RefCell<HashMap<TemplateId, HashSet<HabitId>>>,
    checks: RefCell<HashMap<(String, Day), HashSet<HabitId>>>,
    core: RefCell<HashMap<String, HashSet<HabitId>>>,
    settings: RefCell<HashMap<String, UserSettings>>,
}

impl<S: HabitSource> CachingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            habits: RefCell::default(),
            plans: RefCell::default(),
            templates: RefCell::default(),
            checks: RefCell::default(),
            core: RefCell::default(),
            settings: RefCell::default(),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn cached<K, V, F>(cache: &RefCell<HashMap<K, V>>, key: K, load: F) -> Result<V, SourceError>
where
    K: std::hash::Hash + Eq,
    V: Clone,
    F: FnOnce() -> Result<V, SourceError>,
{
    if let Some(v) = cache.borrow().get(&key) {
        return Ok(v.clone());
    }
    let v = load()?;
    cache.borrow_mut().insert(key, v.clone());
    Ok(v)
}

impl<S: HabitSource> HabitSource for CachingSource<S> {
    fn active_habits(&self, user: &str) -> Result<Vec<Habit>, SourceError> {
        cached(&self.habits, user.to_string(), || self.inner.active_habits(user))
    }

    fn day_plan_template(&self, user: &str, day: Day) -> Result<Option<TemplateId>, SourceError> {
        cached(&self.plans, (user.to_string(), day), || {
            self.inner.day_plan_template(user, day)
        })
    }

    fn template_habit_ids(&self, template: &str) -> Result<HashSet<HabitId>, SourceError> {
        cached(&self.templates, template.to_string(), || {
            self.inner.template_habit_ids(template)
        })
    }

    fn completions(&self, user: &str, day: Day) -> Result<HashSet<HabitId>, SourceError> {
        cached(&self.checks, (user.to_string(), day), || {
            self.inner.completions(user, day)
        })
    }

    fn core_habit_ids(&self, user: &str) -> Result<HashSet<HabitId>, SourceError> {
        cached(&self.core, user.to_string(), || self.inner.core_habit_ids(user))
    }

    fn user_settings(&self, user: &str) -> Result<UserSettings, SourceError> {
        cached(&self.settings, user.to_string(), || self.inner.user_settings(user))
    }
}
