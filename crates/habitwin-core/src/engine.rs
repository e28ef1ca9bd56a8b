//! Query API over a [`HabitSource`].
//!
//! Every query reads fresh state from the source and evaluates it with the
//! pure stats components. Nothing is cached between queries; with
//! `memoize_reads` on, a [`CachingSource`] dedups reads within one query.
//! There is no snapshot isolation: a write landing mid-scan may be seen by
//! later days and not earlier ones.

use tracing::{debug, info};

use crate::calendar::{trailing_days, Day, DayRange, YearMonth};
use crate::error::{ConfigError, Result, SourceError};
use crate::model::DayOutcome;
use crate::source::{CachingSource, HabitSource};
use crate::stats::{
    DaySnapshot, EvaluationContext, PointsAggregator, StreakBundle, StreakCalculator,
    StreakLimits, WinEvaluator,
};
use crate::storage::EngineConfig;

/// Day outcome and streak queries for one source.
pub struct Engine<S> {
    source: S,
    calculator: StreakCalculator,
    memoize_reads: bool,
}

impl<S: HabitSource> Engine<S> {
    /// Engine with default limits and no memoization.
    pub fn new(source: S) -> Self {
        Self {
            source,
            calculator: StreakCalculator::new(),
            memoize_reads: false,
        }
    }

    /// Engine with limits and memoization taken from `config`.
    ///
    /// # Errors
    /// Returns an error if the config fails validation.
    pub fn with_config(source: S, config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            calculator: StreakCalculator::with_limits(config.streaks),
            memoize_reads: config.memoize_reads,
        })
    }

    /// Replace the streak limits. Zero horizons or caps are rejected.
    pub fn with_limits(mut self, limits: StreakLimits) -> Result<Self, ConfigError> {
        limits.validate()?;
        self.calculator = StreakCalculator::with_limits(limits);
        Ok(self)
    }

    pub fn with_memoized_reads(mut self, enabled: bool) -> Self {
        self.memoize_reads = enabled;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn limits(&self) -> &StreakLimits {
        self.calculator.limits()
    }

    /// Outcome for a single day.
    pub fn evaluate_day(&self, user: &str, day: Day) -> Result<DayOutcome> {
        Ok(evaluate_day_with(&self.source, user, day)?)
    }

    /// Outcome per day from `start` through `end`, inclusive. Empty when
    /// `start > end`. No streak logic.
    pub fn evaluate_range(&self, user: &str, start: Day, end: Day) -> Result<Vec<DayOutcome>> {
        let range = DayRange::new(start, end);
        let outcomes = if self.memoize_reads {
            evaluate_days_with(&CachingSource::new(&self.source), user, range.days())?
        } else {
            evaluate_days_with(&self.source, user, range.days())?
        };
        info!(user, %start, %end, days = outcomes.len(), "evaluated range");
        Ok(outcomes)
    }

    /// Outcome per day of a calendar month.
    pub fn evaluate_month(&self, user: &str, month: YearMonth) -> Result<Vec<DayOutcome>> {
        let range = month.range();
        self.evaluate_range(user, range.start, range.end)
    }

    /// Streaks, period win counts and win-rates as of `reference`.
    ///
    /// Any read failure aborts the whole computation; no partial bundle is
    /// returned.
    pub fn compute_streaks_and_stats(&self, user: &str, reference: Day) -> Result<StreakBundle> {
        let bundle = if self.memoize_reads {
            self.streaks_with(&CachingSource::new(&self.source), user, reference)?
        } else {
            self.streaks_with(&self.source, user, reference)?
        };
        info!(
            user,
            day = %reference,
            daily = bundle.daily_streak,
            weekly = bundle.weekly_streak,
            monthly = bundle.monthly_streak,
            "computed streaks"
        );
        Ok(bundle)
    }

    fn streaks_with<T: HabitSource>(
        &self,
        source: &T,
        user: &str,
        reference: Day,
    ) -> Result<StreakBundle, SourceError> {
        let settings = source.user_settings(user)?.resolve();
        let current = evaluate_day_with(source, user, reference)?;
        let days = trailing_days(reference, self.calculator.limits().lookback_days);
        let history = evaluate_days_with(source, user, days)?;
        Ok(self.calculator.summarize(current, &history, &settings))
    }
}

/// Evaluate one day against `source`. Settings and the core set are read
/// on every call.
pub fn evaluate_day_with<S: HabitSource>(
    source: &S,
    user: &str,
    day: Day,
) -> Result<DayOutcome, SourceError> {
    let ctx = EvaluationContext::read(source, user)?;
    let snapshot = DaySnapshot::read(source, user, day)?;
    let points = PointsAggregator::new().aggregate(&snapshot);
    let decision = WinEvaluator::new().evaluate(&ctx, &snapshot, &points);

    debug!(
        user,
        %day,
        total = points.total_points,
        done = points.done_points,
        win = decision.is_win,
        mode = %decision.mode_used,
        fallback = decision.used_fallback,
        "evaluated day"
    );

    Ok(DayOutcome {
        day,
        template_id: points.template_id,
        total_points: points.total_points,
        done_points: points.done_points,
        is_win: decision.is_win,
        mode_used: decision.mode_used,
        used_fallback: decision.used_fallback,
    })
}

fn evaluate_days_with<S, I>(source: &S, user: &str, days: I) -> Result<Vec<DayOutcome>, SourceError>
where
    S: HabitSource,
    I: IntoIterator<Item = Day>,
{
    days.into_iter()
        .map(|day| evaluate_day_with(source, user, day))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::model::{Habit, HabitId, HabitSection, TemplateId, UserSettings, WinMode};
    use crate::source::MemorySource;
    use std::cell::Cell;
    use std::collections::HashSet;

    const USER: &str = "u1";

    fn d(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn habit(id: &str, points: u32) -> Habit {
        Habit {
            id: id.into(),
            name: id.into(),
            points,
            section: HabitSection::Morning,
            sort_order: 0,
            active: true,
        }
    }

    fn two_habit_source() -> MemorySource {
        let mut src = MemorySource::new();
        src.put_habit(USER, habit("h1", 10));
        src.put_habit(USER, habit("h2", 10));
        src
    }

    #[test]
    fn evaluate_day_points_mode() {
        let mut src = two_habit_source();
        let day = d("2024-05-01");
        src.set_check(USER, day, "h1", true);
        let engine = Engine::new(src);

        let out = engine.evaluate_day(USER, day).unwrap();
        assert_eq!(out.total_points, 20);
        assert_eq!(out.done_points, 10);
        assert!(!out.is_win);
        assert_eq!(out.mode_used, WinMode::Points);
        assert!(!out.used_fallback);
    }

    #[test]
    fn evaluate_day_with_no_habits_is_a_loss_not_an_error() {
        let engine = Engine::new(MemorySource::new());
        let out = engine.evaluate_day("nobody", d("2024-05-01")).unwrap();
        assert_eq!((out.total_points, out.done_points), (0, 0));
        assert!(!out.is_win);
    }

    #[test]
    fn evaluate_range_is_inclusive_and_ordered() {
        let mut src = two_habit_source();
        src.set_check(USER, d("2024-05-02"), "h1", true);
        src.set_check(USER, d("2024-05-02"), "h2", true);
        let engine = Engine::new(src);

        let outs = engine.evaluate_range(USER, d("2024-05-01"), d("2024-05-03")).unwrap();
        let wins: Vec<(String, bool)> = outs.iter().map(|o| (o.day.to_string(), o.is_win)).collect();
        assert_eq!(
            wins,
            vec![
                ("2024-05-01".to_string(), false),
                ("2024-05-02".to_string(), true),
                ("2024-05-03".to_string(), false),
            ]
        );
        assert!(engine
            .evaluate_range(USER, d("2024-05-03"), d("2024-05-01"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn evaluate_month_covers_whole_month() {
        let engine = Engine::new(two_habit_source());
        let outs = engine.evaluate_month(USER, "2024-02".parse().unwrap()).unwrap();
        assert_eq!(outs.len(), 29);
        assert_eq!(outs[0].day, d("2024-02-01"));
        assert_eq!(outs[28].day, d("2024-02-29"));
    }

    #[test]
    fn streaks_with_small_horizon() {
        let mut src = two_habit_source();
        for day in ["2024-05-08", "2024-05-09", "2024-05-10"] {
            src.set_check(USER, d(day), "h1", true);
            src.set_check(USER, d(day), "h2", true);
        }
        let limits = StreakLimits {
            lookback_days: 7,
            max_week_iterations: 2,
            max_month_iterations: 2,
        };
        let engine = Engine::new(src).with_limits(limits).unwrap();

        let b = engine.compute_streaks_and_stats(USER, d("2024-05-10")).unwrap();
        assert_eq!(b.daily_streak, 3);
        assert_eq!(b.wins_this_week, 3);
        assert_eq!(b.weekly_target, 5);
        assert_eq!(b.weekly_streak, 0);
        assert_eq!(b.monthly_streak, 0);
        assert!((b.win_rate_7 - 3.0 / 7.0).abs() < 1e-12);
        // Only 7 days exist in the history
        assert!((b.win_rate_30 - 3.0 / 7.0).abs() < 1e-12);
        assert!(b.current_day_outcome.is_win);
        assert_eq!(b.threshold_percent, 70);
    }

    #[test]
    fn streak_targets_come_from_settings() {
        let mut src = two_habit_source();
        src.set_settings(
            USER,
            UserSettings {
                win_mode: Some(WinMode::Core),
                win_threshold_percent: Some(50),
                weekly_win_target: Some(1),
                monthly_win_target: Some(1),
            },
        );
        // Core set empty, so points fallback at 50%
        src.set_check(USER, d("2024-05-10"), "h1", true);
        let engine = Engine::new(src);

        let b = engine.compute_streaks_and_stats(USER, d("2024-05-10")).unwrap();
        assert!(b.current_day_outcome.is_win);
        assert!(b.current_day_outcome.used_fallback);
        assert_eq!(b.weekly_streak, 1);
        assert_eq!(b.monthly_streak, 1);
        assert_eq!(b.threshold_percent, 50);
    }

    #[test]
    fn memoized_reads_give_same_bundle() {
        let mut src = two_habit_source();
        src.set_check(USER, d("2024-05-10"), "h1", true);
        src.set_check(USER, d("2024-05-10"), "h2", true);
        let plain = Engine::new(src.clone()).compute_streaks_and_stats(USER, d("2024-05-10")).unwrap();
        let cached = Engine::new(src)
            .with_memoized_reads(true)
            .compute_streaks_and_stats(USER, d("2024-05-10"))
            .unwrap();
        assert_eq!(plain, cached);
    }

    /// Fails every completion read after `ok_reads` successes.
    struct FlakySource {
        inner: MemorySource,
        ok_reads: Cell<u32>,
    }

    impl HabitSource for FlakySource {
        fn active_habits(&self, user: &str) -> Result<Vec<Habit>, SourceError> {
            self.inner.active_habits(user)
        }
        fn day_plan_template(&self, user: &str, day: Day) -> Result<Option<TemplateId>, SourceError> {
            self.inner.day_plan_template(user, day)
        }
        fn template_habit_ids(&self, t: &str) -> Result<HashSet<HabitId>, SourceError> {
            self.inner.template_habit_ids(t)
        }
        fn completions(&self, user: &str, day: Day) -> Result<HashSet<HabitId>, SourceError> {
            if self.ok_reads.get() == 0 {
                return Err(SourceError::Unavailable {
                    source_name: "flaky".into(),
                    message: "connection reset".into(),
                });
            }
            self.ok_reads.set(self.ok_reads.get() - 1);
            self.inner.completions(user, day)
        }
        fn core_habit_ids(&self, user: &str) -> Result<HashSet<HabitId>, SourceError> {
            self.inner.core_habit_ids(user)
        }
        fn user_settings(&self, user: &str) -> Result<UserSettings, SourceError> {
            self.inner.user_settings(user)
        }
    }

    #[test]
    fn read_failure_mid_scan_propagates_without_partial_result() {
        let engine = Engine::new(FlakySource {
            inner: two_habit_source(),
            ok_reads: Cell::new(10),
        });
        let err = engine
            .compute_streaks_and_stats(USER, d("2024-05-10"))
            .unwrap_err();
        assert!(err.is_dependency_failure());
        match err {
            CoreError::DependencyUnavailable(SourceError::Unavailable { source_name, .. }) => {
                assert_eq!(source_name, "flaky")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn zero_limits_are_rejected_before_any_scan() {
        let zero_lookback = StreakLimits {
            lookback_days: 0,
            ..StreakLimits::default()
        };
        let err = Engine::new(two_habit_source()).with_limits(zero_lookback).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidValue { ref key, .. }) if key == "streaks.lookback_days"
        ));

        let config = EngineConfig {
            streaks: StreakLimits {
                max_week_iterations: 0,
                ..StreakLimits::default()
            },
            ..EngineConfig::default()
        };
        assert!(Engine::with_config(two_habit_source(), &config).is_err());
        assert!(Engine::with_config(two_habit_source(), &EngineConfig::default()).is_ok());
    }
}
