//! Day outcome and streak statistics
//!
//! This module turns raw habit state into per-day win/lose decisions and
//! aggregates those decisions into streaks and win-rates:
//! - **Points**: total vs. earned points over the day's habit subset
//! - **Win**: threshold or core-set rule, with fallback
//! - **Streak**: bounded backward scans over days, weeks and months

mod context;
mod points;
mod streak;
mod win;

pub use context::{DaySnapshot, EvaluationContext};

pub use points::{PointsAggregator, PointsSummary};

pub use win::{WinDecision, WinEvaluator};

pub use streak::{
    daily_streak, win_rate, wins_in_range, StreakBundle, StreakCalculator, StreakLimits,
};
