//! Daily win/lose decision.
//!
//! Two rules exist:
//! - **Points**: done points reach `threshold_percent` of the day's total.
//! - **Core**: every habit of the user's core set is checked that day.
//!
//! Core mode with an empty core set falls back to the points rule. The core
//! check looks at the raw checked set and ignores the day's template, while
//! the points rule only sees the template's habits.

use serde::{Deserialize, Serialize};

use super::context::{DaySnapshot, EvaluationContext};
use super::points::PointsSummary;
use crate::model::WinMode;

/// Outcome of a single day's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinDecision {
    pub is_win: bool,
    /// Rule that actually decided; differs from the configured mode on fallback.
    pub mode_used: WinMode,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WinEvaluator;

impl WinEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        ctx: &EvaluationContext,
        snapshot: &DaySnapshot,
        points: &PointsSummary,
    ) -> WinDecision {
        let threshold = ctx.settings.threshold_percent;
        match ctx.settings.win_mode {
            WinMode::Points => WinDecision {
                is_win: points.meets_threshold(threshold),
                mode_used: WinMode::Points,
                used_fallback: false,
            },
            WinMode::Core if ctx.core_habits.is_empty() => WinDecision {
                is_win: points.meets_threshold(threshold),
                mode_used: WinMode::Points,
                used_fallback: true,
            },
            WinMode::Core => WinDecision {
                is_win: ctx.core_habits.is_subset(&snapshot.checked),
                mode_used: WinMode::Core,
                used_fallback: false,
            },
        }
    }
}
