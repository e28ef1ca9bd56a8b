//! Day, week and month streaks over a bounded lookback window.
//!
//! The calculator works on an already-evaluated history: the `lookback_days`
//! consecutive outcomes ending at the reference day, oldest first. Week and
//! month counts only see days inside that window, so a period that starts
//! before the window is undercounted rather than excluded. That is a known
//! approximation and is kept as-is.

use serde::{Deserialize, Serialize};

use crate::calendar::{month_range, week_range, Day, DayRange};
use crate::error::ConfigError;
use crate::model::{DayOutcome, ResolvedSettings};

/// Horizons and iteration caps for the backward scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakLimits {
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_max_week_iterations")]
    pub max_week_iterations: u32,
    #[serde(default = "default_max_month_iterations")]
    pub max_month_iterations: u32,
}

fn default_lookback_days() -> u32 {
    120
}
fn default_max_week_iterations() -> u32 {
    52
}
fn default_max_month_iterations() -> u32 {
    24
}

impl Default for StreakLimits {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            max_week_iterations: default_max_week_iterations(),
            max_month_iterations: default_max_month_iterations(),
        }
    }
}

impl StreakLimits {
    /// Every horizon and cap must be at least 1. A zero lookback leaves the
    /// reference day out of its own history.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("streaks.lookback_days", self.lookback_days),
            ("streaks.max_week_iterations", self.max_week_iterations),
            ("streaks.max_month_iterations", self.max_month_iterations),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be at least 1".into(),
                });
            }
        }
        Ok(())
    }
}

/// Streaks and win-rates for a reference day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakBundle {
    pub day: Day,
    pub daily_streak: u32,
    pub weekly_streak: u32,
    pub monthly_streak: u32,
    pub week: DayRange,
    pub wins_this_week: u32,
    pub weekly_target: u32,
    pub month: DayRange,
    pub wins_this_month: u32,
    pub monthly_target: u32,
    pub win_rate_7: f64,
    pub win_rate_30: f64,
    pub threshold_percent: u32,
    pub current_day_outcome: DayOutcome,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreakCalculator {
    limits: StreakLimits,
}

impl StreakCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: StreakLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &StreakLimits {
        &self.limits
    }

    /// Build the bundle for `current.day` from `history`, which must be the
    /// consecutive outcomes ending at that day, oldest first.
    pub fn summarize(
        &self,
        current: DayOutcome,
        history: &[DayOutcome],
        settings: &ResolvedSettings,
    ) -> StreakBundle {
        let day = current.day;
        let week = week_range(day);
        let month = month_range(day);

        StreakBundle {
            day,
            daily_streak: daily_streak(history),
            weekly_streak: period_streak(
                history,
                day,
                settings.weekly_target,
                self.limits.max_week_iterations,
                week_range,
            ),
            monthly_streak: period_streak(
                history,
                day,
                settings.monthly_target,
                self.limits.max_month_iterations,
                month_range,
            ),
            week,
            wins_this_week: wins_in_range(history, week),
            weekly_target: settings.weekly_target,
            month,
            wins_this_month: wins_in_range(history, month),
            monthly_target: settings.monthly_target,
            win_rate_7: win_rate(history, 7),
            win_rate_30: win_rate(history, 30),
            threshold_percent: settings.threshold_percent,
            current_day_outcome: current,
        }
    }
}

/// Consecutive wins counting back from the newest outcome.
pub fn daily_streak(history: &[DayOutcome]) -> u32 {
    history.iter().rev().take_while(|o| o.is_win).count() as u32
}

pub fn wins_in_range(history: &[DayOutcome], range: DayRange) -> u32 {
    history
        .iter()
        .filter(|o| o.is_win && range.contains(o.day))
        .count() as u32
}

/// Fraction of wins among the newest `n` outcomes. Zero for an empty history.
pub fn win_rate(history: &[DayOutcome], n: usize) -> f64 {
    let tail = &history[history.len().saturating_sub(n)..];
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().filter(|o| o.is_win).count() as f64 / tail.len() as f64
}

/// Count consecutive periods, starting with the one containing `reference`,
/// whose wins reach `target`. Stops at the first short period or after
/// `max_iterations`.
fn period_streak(
    history: &[DayOutcome],
    reference: Day,
    target: u32,
    max_iterations: u32,
    period_of: fn(Day) -> DayRange,
) -> u32 {
    let mut streak = 0;
    let mut cursor = reference;
    for _ in 0..max_iterations {
        let period = period_of(cursor);
        if wins_in_range(history, period) < target {
            break;
        }
        streak += 1;
        cursor = period.start.add_days(-1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::trailing_days;
    use crate::model::{UserSettings, WinMode};

    fn d(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn outcome(day: Day, is_win: bool) -> DayOutcome {
        DayOutcome {
            day,
            template_id: None,
            total_points: 10,
            done_points: if is_win { 10 } else { 0 },
            is_win,
            mode_used: WinMode::Points,
            used_fallback: false,
        }
    }

    /// History of `len` days ending at `end`, winning where `win(day)` holds.
    fn history(end: &str, len: u32, win: impl Fn(Day) -> bool) -> Vec<DayOutcome> {
        trailing_days(d(end), len)
            .into_iter()
            .map(|day| outcome(day, win(day)))
            .collect()
    }

    fn settings(weekly: u32, monthly: u32) -> ResolvedSettings {
        UserSettings {
            weekly_win_target: Some(weekly),
            monthly_win_target: Some(monthly),
            ..UserSettings::default()
        }
        .resolve()
    }

    fn summarize(limits: StreakLimits, h: &[DayOutcome], s: &ResolvedSettings) -> StreakBundle {
        let current = h.last().cloned().unwrap();
        StreakCalculator::with_limits(limits).summarize(current, h, s)
    }

    #[test]
    fn daily_streak_stops_at_first_loss() {
        let lost = d("2024-03-07");
        let h = history("2024-03-10", 10, |day| day != lost);
        assert_eq!(daily_streak(&h), 3);
    }

    #[test]
    fn daily_streak_zero_when_reference_day_lost() {
        let end = d("2024-03-10");
        let h = history("2024-03-10", 10, |day| day != end);
        assert_eq!(daily_streak(&h), 0);
    }

    #[test]
    fn daily_streak_capped_by_history_length() {
        let h = history("2024-03-10", 15, |_| true);
        assert_eq!(daily_streak(&h), 15);
    }

    #[test]
    fn scenario_e_weekly_streak_one_when_prior_week_short() {
        // Week of 2024-03-11 (Mon) .. 2024-03-17 (Sun): 5 wins.
        // Week of 2024-03-04 .. 2024-03-10: 4 wins.
        let current_wins = ["2024-03-11", "2024-03-12", "2024-03-13", "2024-03-14", "2024-03-15"];
        let prior_wins = ["2024-03-04", "2024-03-05", "2024-03-06", "2024-03-07"];
        let wins: Vec<Day> = current_wins.iter().chain(prior_wins.iter()).map(|s| d(s)).collect();
        let h = history("2024-03-17", 60, |day| wins.contains(&day));

        let b = summarize(StreakLimits::default(), &h, &settings(5, 20));
        assert_eq!(b.wins_this_week, 5);
        assert_eq!(b.weekly_streak, 1);
        assert_eq!(b.week.start, d("2024-03-11"));
        assert_eq!(b.week.end, d("2024-03-17"));
    }

    #[test]
    fn weekly_streak_counts_consecutive_weeks() {
        // Win Monday..Friday every week
        let h = history("2024-03-17", 120, |day| day.weekday_from_sunday() >= 1 && day.weekday_from_sunday() <= 5);
        let b = summarize(StreakLimits::default(), &h, &settings(5, 20));
        // Window starts Sunday 2023-11-19: 17 full weeks, then a week holding
        // only that Sunday
        assert_eq!(b.weekly_streak, 17);
    }

    #[test]
    fn weekly_streak_respects_iteration_cap() {
        let h = history("2024-03-17", 120, |_| true);
        let limits = StreakLimits {
            max_week_iterations: 3,
            ..StreakLimits::default()
        };
        assert_eq!(summarize(limits, &h, &settings(5, 20)).weekly_streak, 3);
    }

    #[test]
    fn partial_week_at_horizon_edge_is_undercounted() {
        // 10-day window ending Sunday 2024-03-17 only covers 3 days of the prior week
        let h = history("2024-03-17", 10, |_| true);
        let b = summarize(StreakLimits::default(), &h, &settings(5, 20));
        assert_eq!(b.wins_this_week, 7);
        assert_eq!(b.weekly_streak, 1);
    }

    #[test]
    fn current_week_days_after_reference_are_absent() {
        // Reference Wednesday: only Mon..Wed exist in the history
        let h = history("2024-03-13", 30, |_| true);
        let b = summarize(StreakLimits::default(), &h, &settings(5, 20));
        assert_eq!(b.wins_this_week, 3);
        assert_eq!(b.weekly_streak, 0);
    }

    #[test]
    fn monthly_streak_over_calendar_months() {
        // All of Jan, Feb, Mar 2024 won; December lost entirely
        let h = history("2024-03-31", 120, |day| day >= d("2024-01-01"));
        let b = summarize(StreakLimits::default(), &h, &settings(5, 20));
        assert_eq!(b.wins_this_month, 31);
        assert_eq!(b.monthly_streak, 3);
        assert_eq!(b.month.start, d("2024-03-01"));
        assert_eq!(b.month.end, d("2024-03-31"));
    }

    #[test]
    fn monthly_streak_respects_iteration_cap() {
        let h = history("2024-03-31", 120, |_| true);
        let limits = StreakLimits {
            max_month_iterations: 2,
            ..StreakLimits::default()
        };
        assert_eq!(summarize(limits, &h, &settings(5, 20)).monthly_streak, 2);
    }

    #[test]
    fn win_rates_use_newest_days() {
        // Every one of the last 7 days, then every third day back to day 30
        let end = d("2024-04-30");
        let h = history("2024-04-30", 40, |day| {
            let back = day.days_until(end);
            back < 7 || (back < 30 && back % 3 == 0)
        });
        let b = summarize(StreakLimits::default(), &h, &settings(5, 20));
        assert_eq!(b.win_rate_7, 1.0);
        let expected = (7 + (7..30).filter(|i| i % 3 == 0).count()) as f64 / 30.0;
        assert!((b.win_rate_30 - expected).abs() < 1e-12);
    }

    #[test]
    fn win_rate_short_history_divides_by_available_days() {
        let h = history("2024-04-30", 4, |day| day.day_of_month() % 2 == 0);
        assert_eq!(win_rate(&h, 7), 0.5);
        assert_eq!(win_rate(&[], 7), 0.0);
    }
}
